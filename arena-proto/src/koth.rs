use crate::error::{ProtoError, ProtoResult};
use crate::team::TeamId;

/// King-of-the-Hill zone control status (§3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoneStatus {
    Neutral,
    A,
    B,
    Contested,
}

impl ZoneStatus {
    fn to_byte(self) -> u8 {
        match self {
            ZoneStatus::Neutral => 0,
            ZoneStatus::A => 1,
            ZoneStatus::B => 2,
            ZoneStatus::Contested => 3,
        }
    }

    fn from_byte(b: u8) -> ProtoResult<Self> {
        match b {
            0 => Ok(ZoneStatus::Neutral),
            1 => Ok(ZoneStatus::A),
            2 => Ok(ZoneStatus::B),
            3 => Ok(ZoneStatus::Contested),
            _ => Err(ProtoError::BadPacket("unknown KOTH zone status")),
        }
    }
}

/// KOTH mode state (§4.1). The field list totals 15 bytes; the contract
/// fixes the record at 18 bytes, so 3 reserved zero bytes follow
/// `winner` for forward compatibility.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KothState {
    pub score_a: f32,
    pub score_b: f32,
    pub zone_status: ZoneStatus,
    pub time_elapsed: f32,
    pub game_over: bool,
    pub winner: TeamId,
}

pub const KOTH_STATE_LEN: usize = 18;
const KOTH_RESERVED: [u8; 3] = [0; 3];

pub fn pack_koth_state(s: &KothState) -> Vec<u8> {
    let mut out = Vec::with_capacity(KOTH_STATE_LEN);
    out.extend_from_slice(&s.score_a.to_be_bytes());
    out.extend_from_slice(&s.score_b.to_be_bytes());
    out.push(s.zone_status.to_byte());
    out.extend_from_slice(&s.time_elapsed.to_be_bytes());
    out.push(s.game_over as u8);
    out.push(s.winner.to_byte());
    out.extend_from_slice(&KOTH_RESERVED);
    out
}

pub fn unpack_koth_state(buf: &[u8]) -> ProtoResult<KothState> {
    if buf.len() != KOTH_STATE_LEN {
        return Err(ProtoError::BadPacket("KOTH state must be 18 bytes"));
    }
    let score_a = f32::from_be_bytes(buf[0..4].try_into().unwrap());
    let score_b = f32::from_be_bytes(buf[4..8].try_into().unwrap());
    let zone_status = ZoneStatus::from_byte(buf[8])?;
    let time_elapsed = f32::from_be_bytes(buf[9..13].try_into().unwrap());
    let game_over = buf[13] != 0;
    let winner = TeamId::from_byte(buf[14])?;
    Ok(KothState { score_a, score_b, zone_status, time_elapsed, game_over, winner })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_exact_length() {
        let s = KothState {
            score_a: 25.0,
            score_b: 10.0,
            zone_status: ZoneStatus::Contested,
            time_elapsed: 61.5,
            game_over: false,
            winner: TeamId::Neutral,
        };
        let packed = pack_koth_state(&s);
        assert_eq!(packed.len(), KOTH_STATE_LEN);
        assert_eq!(unpack_koth_state(&packed).unwrap(), s);
    }

    #[test]
    fn rejects_wrong_length() {
        let mut packed = pack_koth_state(&KothState {
            score_a: 0.0,
            score_b: 0.0,
            zone_status: ZoneStatus::Neutral,
            time_elapsed: 0.0,
            game_over: false,
            winner: TeamId::Neutral,
        });
        packed.pop();
        assert!(unpack_koth_state(&packed).is_err());
    }
}

use crate::error::{ProtoError, ProtoResult};

/// Game mode identifier, used by `SELECT_MODE`/`MODE_SELECTED` and by
/// the lobby's consensus protocol (§4.9).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModeId {
    Survival,
    Koth,
    Ctf,
}

impl ModeId {
    pub fn to_byte(self) -> u8 {
        match self {
            ModeId::Survival => 0,
            ModeId::Koth => 1,
            ModeId::Ctf => 2,
        }
    }

    pub fn from_byte(b: u8) -> ProtoResult<Self> {
        match b {
            0 => Ok(ModeId::Survival),
            1 => Ok(ModeId::Koth),
            2 => Ok(ModeId::Ctf),
            _ => Err(ProtoError::BadPacket("unknown mode id")),
        }
    }
}

/// The leading byte of every framed message (§4.1, §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageType {
    Entities,
    Walls,
    Bullets,
    CtfState,
    KothState,
    ClientReady,
    StartGame,
    GameEnd,
    SelectMode,
    ModeSelected,
}

impl MessageType {
    fn to_byte(self) -> u8 {
        match self {
            MessageType::Entities => 1,
            MessageType::Walls => 2,
            MessageType::Bullets => 3,
            MessageType::CtfState => 4,
            MessageType::KothState => 5,
            MessageType::ClientReady => 6,
            MessageType::StartGame => 7,
            MessageType::GameEnd => 8,
            MessageType::SelectMode => 9,
            MessageType::ModeSelected => 10,
        }
    }

    fn from_byte(b: u8) -> ProtoResult<Self> {
        match b {
            1 => Ok(MessageType::Entities),
            2 => Ok(MessageType::Walls),
            3 => Ok(MessageType::Bullets),
            4 => Ok(MessageType::CtfState),
            5 => Ok(MessageType::KothState),
            6 => Ok(MessageType::ClientReady),
            7 => Ok(MessageType::StartGame),
            8 => Ok(MessageType::GameEnd),
            9 => Ok(MessageType::SelectMode),
            10 => Ok(MessageType::ModeSelected),
            _ => Err(ProtoError::BadPacket("unknown frame type")),
        }
    }
}

/// Prefix `payload` with its one-byte frame type.
pub fn encode_frame(ty: MessageType, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + payload.len());
    out.push(ty.to_byte());
    out.extend_from_slice(payload);
    out
}

/// Split a raw binary frame into its type and payload.
pub fn decode_frame(buf: &[u8]) -> ProtoResult<(MessageType, &[u8])> {
    let (&ty_byte, rest) = buf
        .split_first()
        .ok_or(ProtoError::BadPacket("empty frame"))?;
    Ok((MessageType::from_byte(ty_byte)?, rest))
}

/// `GAME_END` carries a single byte: the winning team (0 for tie).
pub fn encode_game_end(winner_byte: u8) -> Vec<u8> {
    encode_frame(MessageType::GameEnd, &[winner_byte])
}

pub fn decode_game_end(payload: &[u8]) -> ProtoResult<u8> {
    payload
        .first()
        .copied()
        .ok_or(ProtoError::BadPacket("GAME_END missing winner byte"))
}

/// `SELECT_MODE` carries a single mode-id byte.
pub fn encode_select_mode(mode: ModeId) -> Vec<u8> {
    encode_frame(MessageType::SelectMode, &[mode.to_byte()])
}

pub fn decode_select_mode(payload: &[u8]) -> ProtoResult<ModeId> {
    let b = payload
        .first()
        .copied()
        .ok_or(ProtoError::BadPacket("SELECT_MODE missing mode byte"))?;
    ModeId::from_byte(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_round_trips_type_and_payload() {
        let framed = encode_frame(MessageType::Entities, &[1, 2, 3]);
        let (ty, payload) = decode_frame(&framed).unwrap();
        assert_eq!(ty, MessageType::Entities);
        assert_eq!(payload, &[1, 2, 3]);
    }

    #[test]
    fn client_ready_has_no_payload() {
        let framed = encode_frame(MessageType::ClientReady, &[]);
        let (ty, payload) = decode_frame(&framed).unwrap();
        assert_eq!(ty, MessageType::ClientReady);
        assert!(payload.is_empty());
    }

    #[test]
    fn game_end_carries_winner_byte() {
        let framed = encode_game_end(1);
        let (ty, payload) = decode_frame(&framed).unwrap();
        assert_eq!(ty, MessageType::GameEnd);
        assert_eq!(decode_game_end(payload).unwrap(), 1);
    }

    #[test]
    fn select_mode_round_trips() {
        let framed = encode_select_mode(ModeId::Ctf);
        let (ty, payload) = decode_frame(&framed).unwrap();
        assert_eq!(ty, MessageType::SelectMode);
        assert_eq!(decode_select_mode(payload).unwrap(), ModeId::Ctf);
    }

    #[test]
    fn rejects_empty_frame() {
        assert!(decode_frame(&[]).is_err());
    }

    #[test]
    fn rejects_unknown_type_byte() {
        assert!(decode_frame(&[200, 1, 2]).is_err());
    }
}

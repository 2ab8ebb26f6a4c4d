use crate::error::{ProtoError, ProtoResult};
use crate::team::TeamId;

/// One row of the bullet snapshot (§4.1). Exactly 17 bytes on the wire:
/// `id:u16 | x:f32 | y:f32 | radius:f32 | owner:u16 | team:u8`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulletRecord {
    pub id: u16,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub owner: u16,
    pub team: TeamId,
}

pub const BULLET_RECORD_LEN: usize = 17;

impl BulletRecord {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.id.to_be_bytes());
        out.extend_from_slice(&self.x.to_be_bytes());
        out.extend_from_slice(&self.y.to_be_bytes());
        out.extend_from_slice(&self.radius.to_be_bytes());
        out.extend_from_slice(&self.owner.to_be_bytes());
        out.push(self.team.to_byte());
    }

    fn decode(buf: &[u8]) -> ProtoResult<Self> {
        debug_assert_eq!(buf.len(), BULLET_RECORD_LEN);
        let id = u16::from_be_bytes(buf[0..2].try_into().unwrap());
        let x = f32::from_be_bytes(buf[2..6].try_into().unwrap());
        let y = f32::from_be_bytes(buf[6..10].try_into().unwrap());
        let radius = f32::from_be_bytes(buf[10..14].try_into().unwrap());
        let owner = u16::from_be_bytes(buf[14..16].try_into().unwrap());
        let team = TeamId::from_byte(buf[16])?;
        if !(radius > 0.0) {
            return Err(ProtoError::BadPacket("bullet radius must be > 0"));
        }
        Ok(BulletRecord { id, x, y, radius, owner, team })
    }
}

/// Encode `count:u16 | count * bullet-record`.
pub fn pack_bullets(bullets: &[BulletRecord]) -> ProtoResult<Vec<u8>> {
    if bullets.len() > u16::MAX as usize {
        return Err(ProtoError::BufferOverflow(bullets.len()));
    }
    let mut out = Vec::with_capacity(2 + bullets.len() * BULLET_RECORD_LEN);
    out.extend_from_slice(&(bullets.len() as u16).to_be_bytes());
    for b in bullets {
        b.encode(&mut out);
    }
    Ok(out)
}

/// Decode `count:u16 | count * bullet-record`.
pub fn unpack_bullets(buf: &[u8]) -> ProtoResult<Vec<BulletRecord>> {
    if buf.len() < 2 {
        return Err(ProtoError::BadPacket("bullet snapshot shorter than header"));
    }
    let count = u16::from_be_bytes(buf[0..2].try_into().unwrap()) as usize;
    let expected = 2 + count * BULLET_RECORD_LEN;
    if buf.len() != expected {
        return Err(ProtoError::BadPacket("bullet snapshot length mismatch"));
    }
    let mut out = Vec::with_capacity(count);
    let mut off = 2;
    for _ in 0..count {
        out.push(BulletRecord::decode(&buf[off..off + BULLET_RECORD_LEN])?);
        off += BULLET_RECORD_LEN;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BulletRecord {
        BulletRecord { id: 42, x: 1.0, y: 2.0, radius: 5.0, owner: 3, team: TeamId::B }
    }

    #[test]
    fn round_trips_single_bullet() {
        let b = sample();
        let packed = pack_bullets(&[b]).unwrap();
        assert_eq!(packed.len(), 2 + BULLET_RECORD_LEN);
        assert_eq!(unpack_bullets(&packed).unwrap(), vec![b]);
    }

    #[test]
    fn round_trips_empty_list() {
        let packed = pack_bullets(&[]).unwrap();
        assert_eq!(unpack_bullets(&packed).unwrap(), vec![]);
    }

    #[test]
    fn rejects_truncated_buffer() {
        let mut packed = pack_bullets(&[sample()]).unwrap();
        packed.truncate(packed.len() - 1);
        assert!(unpack_bullets(&packed).is_err());
    }
}

use crate::error::{ProtoError, ProtoResult};
use crate::team::TeamId;

/// Ammo sentinel meaning "never needs to reload".
pub const INFINITE_AMMO: u16 = u16::MAX;

/// One row of the entity snapshot (§4.1). Exactly 25 bytes on the wire:
/// `id:u16 | x:f32 | y:f32 | radius:f32 | gunAngle:f32 | team:u8 | health:f32 | ammo:u16`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityRecord {
    pub id: u16,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub gun_angle: f32,
    pub team: TeamId,
    pub health: f32,
    pub ammo: u16,
}

pub const ENTITY_RECORD_LEN: usize = 25;

impl EntityRecord {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.id.to_be_bytes());
        out.extend_from_slice(&self.x.to_be_bytes());
        out.extend_from_slice(&self.y.to_be_bytes());
        out.extend_from_slice(&self.radius.to_be_bytes());
        out.extend_from_slice(&self.gun_angle.to_be_bytes());
        out.push(self.team.to_byte());
        out.extend_from_slice(&self.health.to_be_bytes());
        out.extend_from_slice(&self.ammo.to_be_bytes());
    }

    fn decode(buf: &[u8]) -> ProtoResult<Self> {
        debug_assert_eq!(buf.len(), ENTITY_RECORD_LEN);
        let id = u16::from_be_bytes(buf[0..2].try_into().unwrap());
        let x = f32::from_be_bytes(buf[2..6].try_into().unwrap());
        let y = f32::from_be_bytes(buf[6..10].try_into().unwrap());
        let radius = f32::from_be_bytes(buf[10..14].try_into().unwrap());
        let gun_angle = f32::from_be_bytes(buf[14..18].try_into().unwrap());
        let team = TeamId::from_byte(buf[18])?;
        let health = f32::from_be_bytes(buf[19..23].try_into().unwrap());
        let ammo = u16::from_be_bytes(buf[23..25].try_into().unwrap());
        if !(radius > 0.0) {
            return Err(ProtoError::BadPacket("entity radius must be > 0"));
        }
        Ok(EntityRecord { id, x, y, radius, gun_angle, team, health, ammo })
    }
}

/// Encode `count:u16 | count * entity-record`.
pub fn pack_entities(entities: &[EntityRecord]) -> ProtoResult<Vec<u8>> {
    if entities.len() > u16::MAX as usize {
        return Err(ProtoError::BufferOverflow(entities.len()));
    }
    let mut out = Vec::with_capacity(2 + entities.len() * ENTITY_RECORD_LEN);
    out.extend_from_slice(&(entities.len() as u16).to_be_bytes());
    for e in entities {
        e.encode(&mut out);
    }
    Ok(out)
}

/// Decode `count:u16 | count * entity-record`, failing if the declared
/// count doesn't match the buffer length exactly.
pub fn unpack_entities(buf: &[u8]) -> ProtoResult<Vec<EntityRecord>> {
    if buf.len() < 2 {
        return Err(ProtoError::BadPacket("entity snapshot shorter than header"));
    }
    let count = u16::from_be_bytes(buf[0..2].try_into().unwrap()) as usize;
    let expected = 2 + count * ENTITY_RECORD_LEN;
    if buf.len() != expected {
        return Err(ProtoError::BadPacket("entity snapshot length mismatch"));
    }
    let mut out = Vec::with_capacity(count);
    let mut off = 2;
    for _ in 0..count {
        out.push(EntityRecord::decode(&buf[off..off + ENTITY_RECORD_LEN])?);
        off += ENTITY_RECORD_LEN;
    }
    Ok(out)
}

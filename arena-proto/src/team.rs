use crate::error::{ProtoError, ProtoResult};

/// Team ownership, shared by entities, bullets, and mode state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TeamId {
    Neutral,
    A,
    B,
}

impl TeamId {
    pub fn to_byte(self) -> u8 {
        match self {
            TeamId::Neutral => 0,
            TeamId::A => 1,
            TeamId::B => 2,
        }
    }

    pub fn from_byte(b: u8) -> ProtoResult<Self> {
        match b {
            0 => Ok(TeamId::Neutral),
            1 => Ok(TeamId::A),
            2 => Ok(TeamId::B),
            _ => Err(ProtoError::BadPacket("unknown team id")),
        }
    }
}

//! Wire codec for the arena server (C1).
//!
//! All multi-byte integers are big-endian; floats are 32-bit IEEE-754.
//! Every encode/decode pair here is exercised by a round-trip test —
//! see each module for the exact byte layout it implements.

pub mod bullet;
pub mod ctf;
pub mod entity;
pub mod error;
pub mod frame;
pub mod koth;
pub mod team;
pub mod walls;

pub use bullet::{pack_bullets, unpack_bullets, BulletRecord, BULLET_RECORD_LEN};
pub use ctf::{pack_ctf_state, unpack_ctf_state, CtfFlagJson, CtfStateJson};
pub use entity::{pack_entities, unpack_entities, EntityRecord, ENTITY_RECORD_LEN, INFINITE_AMMO};
pub use error::{ProtoError, ProtoResult};
pub use frame::{
    decode_frame, decode_game_end, decode_select_mode, encode_frame, encode_game_end,
    encode_select_mode, MessageType, ModeId,
};
pub use koth::{pack_koth_state, unpack_koth_state, KothState, ZoneStatus, KOTH_STATE_LEN};
pub use team::TeamId;
pub use walls::{pack_wall_changes, unpack_wall_changes, WallChange, WallOp, WALL_CHANGE_LEN};

use crate::error::{ProtoError, ProtoResult};
use serde::{Deserialize, Serialize};

/// JSON shape of one flag within the CTF state blob (§4.1).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CtfFlagJson {
    pub x: f32,
    pub y: f32,
    pub carrier: Option<u16>,
    pub at_base: bool,
}

/// CTF mode state. This is the one wire record encoded as JSON rather
/// than packed bytes — readability was preferred here over compactness
/// (§4.1) — so the field set below is load-bearing: clients decode it
/// by name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CtfStateJson {
    pub team_a_captures: u32,
    pub team_b_captures: u32,
    pub flag_team_a: CtfFlagJson,
    pub flag_team_b: CtfFlagJson,
    pub time_elapsed: f32,
    pub max_time: f32,
    pub max_captures: u32,
    pub game_over: bool,
    /// `"neutral"`, `"a"`, or `"b"`.
    pub winner_team: String,
}

pub fn pack_ctf_state(state: &CtfStateJson) -> ProtoResult<Vec<u8>> {
    serde_json::to_vec(state).map_err(|_| ProtoError::BadPacket("CTF state failed to serialize"))
}

pub fn unpack_ctf_state(buf: &[u8]) -> ProtoResult<CtfStateJson> {
    serde_json::from_slice(buf).map_err(|_| ProtoError::BadPacket("CTF state is not valid JSON"))
}

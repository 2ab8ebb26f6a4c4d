use serde::Deserialize;

/// World grid sizing (§3, §6): `width`/`height` are pixel dimensions,
/// `cell` is the grid side `G`.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    pub cell: f32,
}

impl WorldConfig {
    pub fn cols(&self) -> u16 {
        (self.width / self.cell) as u16
    }

    pub fn rows(&self) -> u16 {
        (self.height / self.cell) as u16
    }
}

/// FOV ray-cast parameters (§4.3): `rho` is the radius ratio, `phi` the
/// cone opening in radians, `n` the ray count (N+1 rays are cast), `k`
/// the step divisor (`G/k` per step).
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct FovConfig {
    pub rho: f32,
    pub phi: f32,
    pub n: u32,
    pub k: u32,
}

/// Per-agent defaults (§6): health, weapon, and movement tuning shared
/// by every spawned agent in a match.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct AgentConfig {
    pub max_health: f32,
    pub radius: f32,
    pub speed: f32,
    pub damage: f32,
    pub shoot_cooldown: f32,
    /// `None` means infinite ammo (the `INFINITE` sentinel at the wire layer).
    pub magazine_size: Option<u16>,
    pub reload_duration: f32,
    pub gun_rotation_speed: f32,
    pub bullet_speed: f32,
    pub bullet_lifetime: f32,
    pub bullet_radius: f32,
    /// Bullet spawn offset from agent center, as a multiple of agent radius.
    pub fire_offset_ratio: f32,
    pub detection_interval: u64,
}

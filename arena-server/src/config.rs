//! Startup configuration (§6): everything is read once from a TOML
//! file before the listener binds. There is no CLI surface and no
//! environment-variable contract.

use std::path::Path;

use arena_core::{AgentConfig, ArenaError, ArenaResult, CtfConfig, FovConfig, KothConfig, WorldConfig, ZoneShape};
use arena_proto::TeamId;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamConfig {
    A,
    B,
}

impl From<TeamConfig> for TeamId {
    fn from(t: TeamConfig) -> Self {
        match t {
            TeamConfig::A => TeamId::A,
            TeamConfig::B => TeamId::B,
        }
    }
}

/// Which stock policy (§4.6) drives a roster entry.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyConfig {
    RandomWalk,
    Rush,
    ZoneHold,
    CtfRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpawnConfig {
    pub x: f32,
    pub y: f32,
    pub team: TeamConfig,
    pub strategy: StrategyConfig,
    pub gun_angle: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneShapeConfig {
    Circle { cx: f32, cy: f32, r: f32 },
    Rect { x0: f32, y0: f32, x1: f32, y1: f32 },
}

impl From<ZoneShapeConfig> for ZoneShape {
    fn from(z: ZoneShapeConfig) -> Self {
        match z {
            ZoneShapeConfig::Circle { cx, cy, r } => ZoneShape::Circle { cx, cy, r },
            ZoneShapeConfig::Rect { x0, y0, x1, y1 } => ZoneShape::Rect { x0, y0, x1, y1 },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KothModeConfig {
    pub zone: ZoneShapeConfig,
    pub points_per_second: f32,
    pub scoring_interval: f32,
    pub max_points: f32,
    pub max_duration: f32,
    pub contested_blocks_scoring: bool,
}

impl From<KothModeConfig> for KothConfig {
    fn from(c: KothModeConfig) -> Self {
        KothConfig {
            zone: c.zone.into(),
            points_per_second: c.points_per_second,
            scoring_interval: c.scoring_interval,
            max_points: c.max_points,
            max_duration: c.max_duration,
            contested_blocks_scoring: c.contested_blocks_scoring,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CtfModeConfig {
    pub base_a: (f32, f32),
    pub base_b: (f32, f32),
    pub pickup_radius: f32,
    pub return_radius: f32,
    pub points_per_capture: u32,
    pub drops_on_death: bool,
    pub auto_return_time: f32,
    pub max_captures: u32,
    pub max_duration: f32,
}

impl From<CtfModeConfig> for CtfConfig {
    fn from(c: CtfModeConfig) -> Self {
        CtfConfig {
            base_a: c.base_a,
            base_b: c.base_b,
            pickup_radius: c.pickup_radius,
            return_radius: c.return_radius,
            points_per_capture: c.points_per_capture,
            drops_on_death: c.drops_on_death,
            auto_return_time: c.auto_return_time,
            max_captures: c.max_captures,
            max_duration: c.max_duration,
        }
    }
}

fn default_ws_path() -> String {
    "/ws".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:8765".to_string()
}

fn default_grace_period() -> f32 {
    5.0
}

/// Everything the lobby, tick driver, and game manager need, read once
/// at startup (§6). Per-mode configs (`koth`, `ctf`) are optional —
/// absent unless the deployment actually offers that mode.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_ws_path")]
    pub ws_path: String,
    pub required_clients: usize,
    pub sim_hz: f32,
    pub net_hz: f32,
    #[serde(default = "default_grace_period")]
    pub grace_period_secs: f32,
    pub wall_map_path: String,
    pub world: WorldConfig,
    pub fov: FovConfig,
    pub agent: AgentConfig,
    pub koth: Option<KothModeConfig>,
    pub ctf: Option<CtfModeConfig>,
    pub spawns: Vec<SpawnConfig>,
}

impl ServerConfig {
    pub fn load(path: impl AsRef<Path>) -> ArenaResult<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| ArenaError::ConfigFault(e.to_string()))
    }
}

//! Authoritative simulation (C5-C8): the agent/bullet/wall world model,
//! collision resolution, FOV perception, agent strategies, game modes,
//! and the fixed-tick game manager that ties them together.

pub mod agent;
pub mod bullet;
pub mod collision;
pub mod config;
pub mod error;
pub mod manager;
pub mod modes;
pub mod strategy;
pub mod walls;

pub use agent::{Agent, Blocked, Direction, FireEvent};
pub use bullet::Bullet;
pub use collision::{circle_vs_walls, circles_overlap, validate_move, ObstacleKind};
pub use config::{AgentConfig, FovConfig, WorldConfig};
pub use error::{ArenaError, ArenaResult};
pub use manager::{GameManager, SpawnEntry};
pub use modes::{CtfConfig, CtfOverlay, KothConfig, KothOverlay, ModeKind, ModeOverlay, SurvivalOverlay, ZoneShape};
pub use strategy::{AgentCtx, CtfHint, CtfRolePolicy, KothHint, RandomWalkShoot, RushStrafeReload, Strategy, ZoneHoldKoth};
pub use walls::Walls;

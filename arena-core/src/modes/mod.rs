//! Mode overlays (C8): win-condition and scoring layers that run as
//! step 7 of the fixed tick order (§4.7), on top of the shared agent
//! and bullet tables the base game manager owns.

pub mod ctf;
pub mod koth;
pub mod survival;

use std::collections::BTreeMap;

use arena_proto::TeamId;

use crate::agent::Agent;
use crate::strategy::{CtfHint, KothHint};

pub use ctf::{CtfConfig, CtfOverlay};
pub use koth::{KothConfig, KothOverlay, ZoneShape};
pub use survival::SurvivalOverlay;

/// Per-tick hook a game manager drives after collisions and agent
/// purge are resolved. Returns the winning team once the mode decides
/// the match is over (`TeamId::Neutral` for a draw).
pub trait ModeOverlay {
    fn tick(&mut self, dt: f32, agents: &BTreeMap<u16, Agent>) -> Option<TeamId>;

    /// A framed wire message to broadcast this tick, if this mode has
    /// state beyond the agent/bullet tables (KOTH, CTF). Survival has
    /// none.
    fn encode_broadcast(&self) -> Option<Vec<u8>> {
        None
    }

    /// KOTH zone context for `agent`'s strategy, if this mode is KOTH.
    fn koth_hint(&self, _agent: &Agent) -> Option<KothHint> {
        None
    }

    /// CTF flag context for `agent`'s strategy, if this mode is CTF.
    fn ctf_hint(&self, _agent: &Agent) -> Option<CtfHint> {
        None
    }
}

/// Configuration selecting which mode a match runs, carried by the
/// lobby's consensus result (§4.9) into the game manager's constructor.
#[derive(Clone, Debug)]
pub enum ModeKind {
    Survival,
    Koth(KothConfig),
    Ctf(CtfConfig),
}

impl ModeKind {
    pub fn build_overlay(&self) -> Box<dyn ModeOverlay + Send> {
        match self {
            ModeKind::Survival => Box::new(SurvivalOverlay::new()),
            ModeKind::Koth(cfg) => Box::new(KothOverlay::new(cfg.clone())),
            ModeKind::Ctf(cfg) => Box::new(CtfOverlay::new(cfg.clone())),
        }
    }
}

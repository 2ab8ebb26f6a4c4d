use std::collections::{BTreeMap, HashSet};

use arena_proto::TeamId;

use crate::agent::Agent;
use crate::modes::ModeOverlay;

/// No state beyond the agent table (§3): winner is whichever team
/// still has surviving agents once the others are gone.
#[derive(Clone, Copy, Debug)]
pub struct SurvivalOverlay {
    game_over: bool,
    winner: TeamId,
}

impl SurvivalOverlay {
    pub fn new() -> Self {
        Self { game_over: false, winner: TeamId::Neutral }
    }
}

impl ModeOverlay for SurvivalOverlay {
    fn tick(&mut self, _dt: f32, agents: &BTreeMap<u16, Agent>) -> Option<TeamId> {
        if self.game_over {
            return Some(self.winner);
        }
        let teams: HashSet<TeamId> = agents
            .values()
            .filter(|a| a.is_alive() && a.team != TeamId::Neutral)
            .map(|a| a.team)
            .collect();
        if teams.len() == 1 {
            self.game_over = true;
            self.winner = *teams.iter().next().unwrap();
            return Some(self.winner);
        }
        if teams.is_empty() {
            self.game_over = true;
            self.winner = TeamId::Neutral;
            return Some(self.winner);
        }
        None
    }
}

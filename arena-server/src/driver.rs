//! Tick driver and broadcast pump (C10, §4.10).

use std::time::Duration;

use arena_proto::{encode_frame, encode_game_end, MessageType};
use arena_core::GameManager;
use tokio::time::Instant;
use tracing::info;

use crate::lobby::Lobby;

/// Simulation/broadcast cadence for one running match.
pub struct Driver {
    sim_period: Duration,
    net_period: Duration,
    next_tick: Instant,
    since_broadcast: Duration,
}

impl Driver {
    pub fn start(sim_hz: f32, net_hz: f32) -> Self {
        let now = Instant::now();
        Self {
            sim_period: Duration::from_secs_f32(1.0 / sim_hz),
            net_period: Duration::from_secs_f32(1.0 / net_hz),
            next_tick: now,
            since_broadcast: Duration::ZERO,
        }
    }

    /// Duration to sleep before the next call to [`Driver::step`] is
    /// due. The caller (the event-loop select) races this against
    /// incoming lobby events.
    pub fn sleep_duration(&self) -> Duration {
        self.next_tick.saturating_duration_since(Instant::now())
    }

    /// Runs exactly one simulation step if due, then broadcasts a
    /// snapshot if the net period has elapsed (§4.10 step 3).
    pub fn step(&mut self, manager: &mut GameManager, lobby: &Lobby) {
        let now = Instant::now();
        if now < self.next_tick {
            return;
        }
        manager.update(self.sim_period.as_secs_f32());
        self.since_broadcast += self.sim_period;
        self.next_tick += self.sim_period;

        if self.since_broadcast >= self.net_period {
            self.since_broadcast = Duration::ZERO;
            broadcast_snapshot(manager, lobby);
        }
    }
}

/// Entities → bullets → mode-packet, in that fixed order (§5).
fn broadcast_snapshot(manager: &GameManager, lobby: &Lobby) {
    if let Some(entities) = manager.pack_agent_snapshot() {
        lobby.broadcast_all(encode_frame(MessageType::Entities, &entities));
    }
    if let Some(bullets) = manager.pack_bullet_snapshot() {
        lobby.broadcast_all(encode_frame(MessageType::Bullets, &bullets));
    }
    if let Some(mode_frame) = manager.mode_broadcast() {
        lobby.broadcast_all(mode_frame);
    }
}

/// `GAME_END(winner)` broadcast, followed by the post-match grace
/// period before sessions are torn down (§4.10 step 4).
pub async fn run_game_end(lobby: &Lobby, winner_byte: u8, grace_period_secs: f32) {
    info!(winner = winner_byte, "match ended, broadcasting GAME_END");
    lobby.broadcast_all(encode_game_end(winner_byte));
    tokio::time::sleep(Duration::from_secs_f32(grace_period_secs)).await;
}

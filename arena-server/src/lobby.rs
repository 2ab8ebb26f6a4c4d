//! Lobby / mode-consensus protocol (C9, §4.9).

use std::collections::HashMap;

use arena_proto::{encode_frame, MessageType, ModeId};
use tokio::sync::mpsc;
use tracing::info;

use crate::config::ServerConfig;

pub enum LobbyEvent {
    Connected { session_id: u64, outbox: mpsc::UnboundedSender<Vec<u8>> },
    Disconnected(u64),
    ClientReady(u64),
    SelectMode(u64, ModeId),
}

struct SessionEntry {
    outbox: mpsc::UnboundedSender<Vec<u8>>,
    ready: bool,
    selected_mode: Option<ModeId>,
}

/// Session table and consensus state (§4.9). Owned exclusively by the
/// single event-loop task that also runs the tick driver.
pub struct Lobby {
    sessions: HashMap<u64, SessionEntry>,
    required_clients: usize,
    /// Set once consensus installs a mode; cleared when the match ends
    /// or the population drops below `required_clients`.
    pub agreed_mode: Option<ModeId>,
}

impl Lobby {
    pub fn new(config: &ServerConfig) -> Self {
        Self { sessions: HashMap::new(), required_clients: config.required_clients, agreed_mode: None }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn below_required(&self) -> bool {
        self.sessions.len() < self.required_clients
    }

    fn broadcast(&self, frame: Vec<u8>) {
        for session in self.sessions.values() {
            let _ = session.outbox.send(frame.clone());
        }
    }

    pub fn send_to(&self, session_id: u64, frame: Vec<u8>) {
        if let Some(session) = self.sessions.get(&session_id) {
            let _ = session.outbox.send(frame);
        }
    }

    pub fn broadcast_all(&self, frame: Vec<u8>) {
        self.broadcast(frame);
    }

    pub fn on_connected(&mut self, session_id: u64, outbox: mpsc::UnboundedSender<Vec<u8>>) {
        self.sessions.insert(session_id, SessionEntry { outbox, ready: false, selected_mode: None });
        info!(session_id, "session connected");
    }

    /// Returns `true` if removing this session drops the lobby below
    /// `required_clients` while a match is running (the driver must
    /// cancel in that case, §4.9).
    pub fn on_disconnected(&mut self, session_id: u64) -> bool {
        self.sessions.remove(&session_id);
        info!(session_id, "session disconnected");
        self.below_required()
    }

    pub fn on_client_ready(&mut self, session_id: u64) {
        if let Some(s) = self.sessions.get_mut(&session_id) {
            s.ready = true;
        }
    }

    /// Records a mode selection and, if every session now agrees on
    /// one value, installs it as `agreed_mode` and broadcasts
    /// `MODE_SELECTED`. Returns the freshly agreed mode, if any.
    pub fn on_select_mode(&mut self, session_id: u64, mode: ModeId) -> Option<ModeId> {
        if let Some(s) = self.sessions.get_mut(&session_id) {
            s.selected_mode = Some(mode);
        }
        let mut chosen: Option<ModeId> = None;
        for s in self.sessions.values() {
            match s.selected_mode {
                None => return None,
                Some(m) => match chosen {
                    None => chosen = Some(m),
                    Some(prev) if prev == m => {}
                    Some(_) => return None,
                },
            }
        }
        if self.sessions.is_empty() {
            return None;
        }
        if chosen != self.agreed_mode {
            self.agreed_mode = chosen;
            if let Some(m) = chosen {
                self.broadcast(encode_frame(MessageType::ModeSelected, &[m.to_byte()]));
            }
        }
        chosen
    }

    /// All of: enough clients, everyone ready, everyone selected the
    /// same mode (§4.9 start condition).
    pub fn should_start(&self) -> bool {
        self.sessions.len() >= self.required_clients
            && !self.sessions.is_empty()
            && self.sessions.values().all(|s| s.ready)
            && self.agreed_mode.is_some()
    }

    pub fn reset_for_next_match(&mut self) {
        self.agreed_mode = None;
        for s in self.sessions.values_mut() {
            s.ready = false;
            s.selected_mode = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(required_clients: usize) -> ServerConfig {
        ServerConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            ws_path: "/ws".to_string(),
            required_clients,
            sim_hz: 30.0,
            net_hz: 20.0,
            grace_period_secs: 1.0,
            wall_map_path: "walls.txt".to_string(),
            world: arena_core::WorldConfig { width: 640.0, height: 640.0, cell: 32.0 },
            fov: arena_core::FovConfig { rho: 30.0, phi: std::f32::consts::PI, n: 8, k: 2 },
            agent: arena_core::AgentConfig {
                max_health: 100.0,
                radius: 16.0,
                speed: 100.0,
                damage: 25.0,
                shoot_cooldown: 0.8,
                magazine_size: None,
                reload_duration: 1.5,
                gun_rotation_speed: 10.0,
                bullet_speed: 400.0,
                bullet_lifetime: 2.0,
                bullet_radius: 4.0,
                fire_offset_ratio: 1.5,
                detection_interval: 5,
            },
            koth: None,
            ctf: None,
            spawns: Vec::new(),
        }
    }

    fn connect(lobby: &mut Lobby, session_id: u64) -> mpsc::UnboundedReceiver<Vec<u8>> {
        let (tx, rx) = mpsc::unbounded_channel();
        lobby.on_connected(session_id, tx);
        rx
    }

    #[test]
    fn should_not_start_below_required_clients() {
        let mut lobby = Lobby::new(&test_config(2));
        let _rx = connect(&mut lobby, 1);
        lobby.on_client_ready(1);
        lobby.on_select_mode(1, ModeId::Survival);
        assert!(!lobby.should_start());
    }

    #[test]
    fn disagreeing_selections_never_reach_consensus() {
        let mut lobby = Lobby::new(&test_config(2));
        let _a = connect(&mut lobby, 1);
        let _b = connect(&mut lobby, 2);
        lobby.on_client_ready(1);
        lobby.on_client_ready(2);
        assert_eq!(lobby.on_select_mode(1, ModeId::Survival), None);
        assert_eq!(lobby.on_select_mode(2, ModeId::Koth), None);
        assert!(lobby.agreed_mode.is_none());
        assert!(!lobby.should_start());
    }

    #[test]
    fn matching_selections_from_every_session_install_the_mode() {
        let mut lobby = Lobby::new(&test_config(2));
        let _a = connect(&mut lobby, 1);
        let _b = connect(&mut lobby, 2);
        lobby.on_client_ready(1);
        lobby.on_client_ready(2);
        lobby.on_select_mode(1, ModeId::Ctf);
        let chosen = lobby.on_select_mode(2, ModeId::Ctf);
        assert_eq!(chosen, Some(ModeId::Ctf));
        assert_eq!(lobby.agreed_mode, Some(ModeId::Ctf));
        assert!(lobby.should_start());
    }

    #[test]
    fn should_start_requires_every_session_ready() {
        let mut lobby = Lobby::new(&test_config(2));
        let _a = connect(&mut lobby, 1);
        let _b = connect(&mut lobby, 2);
        lobby.on_select_mode(1, ModeId::Survival);
        lobby.on_select_mode(2, ModeId::Survival);
        lobby.on_client_ready(1);
        assert!(!lobby.should_start());
        lobby.on_client_ready(2);
        assert!(lobby.should_start());
    }

    #[test]
    fn disconnect_below_required_is_reported() {
        let mut lobby = Lobby::new(&test_config(2));
        let _a = connect(&mut lobby, 1);
        let _b = connect(&mut lobby, 2);
        assert!(!lobby.on_disconnected(2));
        let below = lobby.on_disconnected(1);
        assert!(below);
        assert_eq!(lobby.session_count(), 0);
    }

    #[test]
    fn reset_for_next_match_clears_readiness_and_selection() {
        let mut lobby = Lobby::new(&test_config(1));
        let _a = connect(&mut lobby, 1);
        lobby.on_client_ready(1);
        lobby.on_select_mode(1, ModeId::Survival);
        assert!(lobby.should_start());
        lobby.reset_for_next_match();
        assert!(lobby.agreed_mode.is_none());
        assert!(!lobby.should_start());
    }
}

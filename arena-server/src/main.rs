//! Arena match server: binds the WebSocket listener, runs the lobby's
//! mode-consensus protocol, and drives one authoritative match at a
//! time to completion.

mod config;
mod driver;
mod lobby;
mod session;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use arena_core::{
    CtfRolePolicy, GameManager, ModeKind, RandomWalkShoot, RushStrafeReload, SpawnEntry, Strategy, Walls,
    ZoneHoldKoth,
};
use arena_proto::{encode_frame, MessageType, ModeId};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use config::{ServerConfig, StrategyConfig};
use lobby::{Lobby, LobbyEvent};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "arena.toml".to_string());
    let config = ServerConfig::load(&config_path)?;
    info!(path = %config_path, "loaded configuration");

    let walls = load_walls(&config)?;

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "listening");

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<LobbyEvent>();
    let next_session_id = Arc::new(AtomicU64::new(1));

    {
        let event_tx = event_tx.clone();
        let next_session_id = next_session_id.clone();
        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!(error = %e, "accept failed");
                        continue;
                    }
                };
                let session_id = next_session_id.fetch_add(1, Ordering::Relaxed);
                let event_tx = event_tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = session::handle_connection(stream, session_id, event_tx).await {
                        warn!(session_id, error = %e, "connection ended with error");
                    }
                });
            }
        });
    }

    let mut lobby = Lobby::new(&config);
    let mut manager: Option<GameManager> = None;
    let mut driver: Option<driver::Driver> = None;

    loop {
        let sleep = driver.as_ref().map(|d| d.sleep_duration()).unwrap_or(Duration::from_secs(3600));
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                handle_event(event, &config, &walls, &mut lobby, &mut manager, &mut driver).await;
            }
            _ = tokio::time::sleep(sleep), if driver.is_some() => {
                if let (Some(mgr), Some(drv)) = (manager.as_mut(), driver.as_mut()) {
                    drv.step(mgr, &lobby);
                    if !mgr.is_running() {
                        let winner_byte = mgr.winner().map(|t| t.to_byte()).unwrap_or(0);
                        driver::run_game_end(&lobby, winner_byte, config.grace_period_secs).await;
                        manager = None;
                        driver = None;
                        lobby.reset_for_next_match();
                    }
                }
            }
        }
    }

    Ok(())
}

async fn handle_event(
    event: LobbyEvent,
    config: &ServerConfig,
    walls: &Walls,
    lobby: &mut Lobby,
    manager: &mut Option<GameManager>,
    driver: &mut Option<driver::Driver>,
) {
    match event {
        LobbyEvent::Connected { session_id, outbox } => lobby.on_connected(session_id, outbox),
        LobbyEvent::Disconnected(session_id) => {
            let below = lobby.on_disconnected(session_id);
            if below && manager.is_some() {
                info!("population dropped below required_clients; cancelling match");
                *manager = None;
                *driver = None;
                lobby.reset_for_next_match();
            }
        }
        LobbyEvent::ClientReady(session_id) => {
            lobby.on_client_ready(session_id);
            try_start_match(config, walls, lobby, manager, driver);
        }
        LobbyEvent::SelectMode(session_id, mode) => {
            lobby.on_select_mode(session_id, mode);
            // Ready-before-select is a valid ordering (§4.9 clause (c) makes
            // no ordering demand), so consensus reached here can also be the
            // event that completes the start condition.
            try_start_match(config, walls, lobby, manager, driver);
        }
    }
}

/// Installs and starts a match if the lobby's start condition (§4.9
/// a-d) is newly satisfied. Called from both the `ClientReady` and
/// `SelectMode` arms, since either can be the event that completes the
/// conjunction.
fn try_start_match(
    config: &ServerConfig,
    walls: &Walls,
    lobby: &mut Lobby,
    manager: &mut Option<GameManager>,
    driver: &mut Option<driver::Driver>,
) {
    if manager.is_some() || !lobby.should_start() {
        return;
    }
    let mode = lobby.agreed_mode.expect("should_start guarantees a mode was agreed");
    match start_match(config, walls, mode) {
        Ok(mgr) => {
            lobby.broadcast_all(encode_frame(MessageType::StartGame, &[]));
            *manager = Some(mgr);
            *driver = Some(driver::Driver::start(config.sim_hz, config.net_hz));
            info!("match started");
        }
        Err(e) => error!(error = %e, "failed to start match"),
    }
}

fn load_walls(config: &ServerConfig) -> Result<Walls> {
    let text = std::fs::read_to_string(&config.wall_map_path)?;
    let lines: Vec<String> = text.lines().map(str::to_string).collect();
    Ok(Walls::load_from_lines(config.world.cols(), config.world.rows(), config.world.cell, &lines))
}

fn start_match(config: &ServerConfig, walls: &Walls, mode: ModeId) -> Result<GameManager> {
    let mode_kind = match mode {
        ModeId::Survival => ModeKind::Survival,
        ModeId::Koth => {
            let cfg = config
                .koth
                .clone()
                .ok_or_else(|| anyhow::anyhow!("KOTH selected but no [koth] section in configuration"))?;
            ModeKind::Koth(cfg.into())
        }
        ModeId::Ctf => {
            let cfg = config
                .ctf
                .clone()
                .ok_or_else(|| anyhow::anyhow!("CTF selected but no [ctf] section in configuration"))?;
            ModeKind::Ctf(cfg.into())
        }
    };

    let mut manager = GameManager::new(walls.clone(), config.agent, config.fov, mode_kind);
    let roster = config
        .spawns
        .iter()
        .map(|s| SpawnEntry {
            x: s.x,
            y: s.y,
            team: s.team.into(),
            gun_angle: s.gun_angle,
            strategy: build_strategy(s.strategy),
        })
        .collect();
    manager.spawn_agents(roster, config.world.width);
    Ok(manager)
}

fn build_strategy(kind: StrategyConfig) -> Box<dyn Strategy> {
    match kind {
        StrategyConfig::RandomWalk => Box::new(RandomWalkShoot::default()),
        StrategyConfig::Rush => Box::new(RushStrafeReload::default()),
        StrategyConfig::ZoneHold => Box::new(ZoneHoldKoth),
        StrategyConfig::CtfRole => Box::new(CtfRolePolicy),
    }
}

//! Game manager (C7): owns the walls, agent table, and bullet table,
//! and runs the fixed eight-step tick order (§4.7).

use std::collections::BTreeMap;

use arena_proto::{pack_bullets, pack_entities, BulletRecord, EntityRecord, TeamId};
use tracing::{error, warn};

use crate::agent::Agent;
use crate::bullet::Bullet;
use crate::collision::{circle_vs_walls, circles_overlap};
use crate::config::{AgentConfig, FovConfig};
use crate::modes::{ModeKind, ModeOverlay};
use crate::strategy::{AgentCtx, Strategy};
use crate::walls::Walls;

/// One roster entry consumed by [`GameManager::spawn_agents`]: spawn
/// position, team, optional explicit gun facing, and the strategy
/// instance that will drive the agent.
pub struct SpawnEntry {
    pub x: f32,
    pub y: f32,
    pub team: TeamId,
    pub gun_angle: Option<f32>,
    pub strategy: Box<dyn Strategy>,
}

/// One match. Constructed with a loaded wall map, agent defaults, FOV
/// tuning, and the selected mode; `spawn_agents` populates the roster,
/// then `update` is called once per simulation tick.
pub struct GameManager {
    walls: Walls,
    agents: BTreeMap<u16, Agent>,
    strategies: BTreeMap<u16, Box<dyn Strategy>>,
    bullets: BTreeMap<u16, Bullet>,
    next_bullet_id: u16,
    next_agent_id: u16,
    tick_count: u64,
    agent_cfg: AgentConfig,
    fov_cfg: FovConfig,
    mode: Box<dyn ModeOverlay + Send>,
    running: bool,
    winner: Option<TeamId>,
}

impl GameManager {
    pub fn new(walls: Walls, agent_cfg: AgentConfig, fov_cfg: FovConfig, mode: ModeKind) -> Self {
        Self {
            walls,
            agents: BTreeMap::new(),
            strategies: BTreeMap::new(),
            bullets: BTreeMap::new(),
            next_bullet_id: 0,
            next_agent_id: 0,
            tick_count: 0,
            agent_cfg,
            fov_cfg,
            mode: mode.build_overlay(),
            running: true,
            winner: None,
        }
    }

    /// Builds the roster from a spawn table. Ids are assigned in
    /// ascending order starting at 0. Entries that omit an explicit
    /// gun facing default to facing across the map: east if spawned
    /// left of map-center, west otherwise (the original server's
    /// auto-facing behavior, carried forward as a supplemented
    /// feature).
    pub fn spawn_agents(&mut self, roster: Vec<SpawnEntry>, map_width: f32) {
        for entry in roster {
            let id = self.next_agent_id;
            self.next_agent_id += 1;
            let gun_angle = entry.gun_angle.unwrap_or(if entry.x < map_width / 2.0 {
                0.0
            } else {
                std::f32::consts::PI
            });
            let agent = Agent::spawn(id, entry.x, entry.y, entry.team, gun_angle, &self.agent_cfg);
            self.agents.insert(id, agent);
            self.strategies.insert(id, entry.strategy);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn winner(&self) -> Option<TeamId> {
        self.winner
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn walls(&self) -> &Walls {
        &self.walls
    }

    pub fn walls_mut(&mut self) -> &mut Walls {
        &mut self.walls
    }

    fn next_bullet_id(&mut self) -> u16 {
        let id = self.next_bullet_id;
        self.next_bullet_id = self.next_bullet_id.wrapping_add(1);
        id
    }

    fn fire_bullet(&mut self, owner: u16, team: TeamId, fire: crate::agent::FireEvent) {
        let id = self.next_bullet_id();
        let bullet = Bullet::new(
            id,
            fire.x,
            fire.y,
            self.agent_cfg.bullet_speed,
            fire.theta,
            owner,
            team,
            self.agent_cfg.damage,
            self.agent_cfg.bullet_lifetime,
            self.agent_cfg.bullet_radius,
        );
        self.bullets.insert(id, bullet);
    }

    /// One simulation tick; the eight steps below run in this fixed
    /// order regardless of mode (§4.7 — tests rely on it).
    pub fn update(&mut self, dt: f32) {
        if !self.running {
            return;
        }

        // 1. Advance bullets; drop expired ones.
        for bullet in self.bullets.values_mut() {
            bullet.advance(dt);
        }
        self.bullets.retain(|_, b| b.is_alive());

        // 2. Internal update + strategy step, per agent in id order.
        let ids: Vec<u16> = self.agents.keys().copied().collect();
        for id in ids {
            let (fire, owner, team) = {
                let agent = self.agents.get_mut(&id).expect("agent present during its own tick");
                (agent.tick_internal(dt, &self.agent_cfg), agent.id, agent.team)
            };
            if let Some(fire) = fire {
                self.fire_bullet(owner, team, fire);
            }

            let mut me = match self.agents.remove(&id) {
                Some(a) => a,
                None => continue,
            };
            if let Some(mut strategy) = self.strategies.remove(&id) {
                let koth = self.mode.koth_hint(&me);
                let ctf = self.mode.ctf_hint(&me);
                let mut ctx = AgentCtx {
                    me: &mut me,
                    others: &self.agents,
                    walls: &self.walls,
                    cfg: &self.agent_cfg,
                    koth,
                    ctf,
                };
                // A faulting strategy must not take the whole match down with
                // it (§7 StrategyFault): the agent simply does nothing this
                // tick, and the fault is logged with its id.
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    strategy.step(&mut ctx, dt);
                }));
                if let Err(payload) = result {
                    let reason = payload
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "strategy panicked".to_string());
                    error!(agent_id = id, reason, "strategy faulted; agent idle this tick");
                }
                self.strategies.insert(id, strategy);
            }
            self.agents.insert(id, me);
        }

        // 3. Periodic FOV detection pass.
        if self.tick_count % self.agent_cfg.detection_interval.max(1) == 0 {
            let snapshot = self.agents.clone();
            for agent in self.agents.values_mut() {
                agent.detect_enemies(&snapshot, &self.walls, &self.fov_cfg);
            }
        }

        // 4. Bullet-vs-agent collisions (before bullet-vs-wall, same tick).
        let mut spent_bullets = Vec::new();
        for (&bid, bullet) in self.bullets.iter() {
            let mut hit = false;
            for agent in self.agents.values_mut() {
                if agent.id == bullet.owner || agent.team == bullet.team || !agent.is_alive() {
                    continue;
                }
                if circles_overlap(bullet.x, bullet.y, bullet.radius, agent.x, agent.y, agent.radius) {
                    agent.take_damage(bullet.damage);
                    hit = true;
                }
            }
            if hit {
                spent_bullets.push(bid);
            }
        }
        for bid in &spent_bullets {
            self.bullets.remove(bid);
        }

        // 5. Bullet-vs-wall collisions.
        let mut wall_hit = Vec::new();
        for (&bid, bullet) in self.bullets.iter() {
            if circle_vs_walls(bullet.x, bullet.y, bullet.radius, &self.walls) {
                wall_hit.push(bid);
            }
        }
        for bid in &wall_hit {
            self.bullets.remove(bid);
        }

        // 6. Purge dead agents, and their id from every survivor's
        // detectedEnemies.
        let dead: Vec<u16> = self.agents.iter().filter(|(_, a)| !a.is_alive()).map(|(&id, _)| id).collect();
        for id in &dead {
            self.agents.remove(id);
            self.strategies.remove(id);
        }
        if !dead.is_empty() {
            for agent in self.agents.values_mut() {
                for id in &dead {
                    agent.detected_enemies.remove(id);
                }
            }
        }

        // 7. Mode overlay hook.
        if let Some(winner) = self.mode.tick(dt, &self.agents) {
            self.winner = Some(winner);
            self.running = false;
        }

        // 8. Tick count.
        self.tick_count += 1;
    }

    pub fn agent_states(&self) -> Vec<EntityRecord> {
        self.agents
            .values()
            .map(|a| EntityRecord {
                id: a.id,
                x: a.x,
                y: a.y,
                radius: a.radius,
                gun_angle: a.gun_angle,
                team: a.team,
                health: a.health,
                ammo: a.current_ammo,
            })
            .collect()
    }

    pub fn bullet_states(&self) -> Vec<BulletRecord> {
        self.bullets
            .values()
            .map(|b| BulletRecord { id: b.id, x: b.x, y: b.y, radius: b.radius, owner: b.owner, team: b.team })
            .collect()
    }

    /// Packed entity snapshot for this tick, or `None` (and a warn log)
    /// if the roster somehow exceeds the wire format's 65535-record cap.
    pub fn pack_agent_snapshot(&self) -> Option<Vec<u8>> {
        match pack_entities(&self.agent_states()) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(error = %e, "skipping entity broadcast this tick");
                None
            }
        }
    }

    pub fn pack_bullet_snapshot(&self) -> Option<Vec<u8>> {
        match pack_bullets(&self.bullet_states()) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(error = %e, "skipping bullet broadcast this tick");
                None
            }
        }
    }

    pub fn mode_broadcast(&self) -> Option<Vec<u8>> {
        self.mode.encode_broadcast()
    }
}

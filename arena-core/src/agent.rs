use std::collections::{BTreeMap, HashSet};
use std::f32::consts::PI;

use arena_proto::{TeamId, INFINITE_AMMO};

use crate::collision::{validate_move, ObstacleKind};
use crate::config::{AgentConfig, FovConfig};
use crate::walls::Walls;

/// 8-way movement direction (§4.5). Diagonals are normalized to
/// `(±√2/2, ±√2/2)`; Y grows upward, matching the world's bottom-left
/// origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl Direction {
    pub fn unit(self) -> (f32, f32) {
        const DIAG: f32 = std::f32::consts::FRAC_1_SQRT_2;
        match self {
            Direction::N => (0.0, 1.0),
            Direction::S => (0.0, -1.0),
            Direction::E => (1.0, 0.0),
            Direction::W => (-1.0, 0.0),
            Direction::Ne => (DIAG, DIAG),
            Direction::Nw => (-DIAG, DIAG),
            Direction::Se => (DIAG, -DIAG),
            Direction::Sw => (-DIAG, -DIAG),
        }
    }
}

/// What stopped an agent's last failed `move` (§3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blocked {
    Wall,
    Agent(u16),
}

/// A bullet spawn request produced by `tick_internal` when the shoot
/// cooldown elapses; the manager turns this into an actual `Bullet`.
#[derive(Clone, Copy, Debug)]
pub struct FireEvent {
    pub x: f32,
    pub y: f32,
    pub theta: f32,
}

/// One combatant, owned by the game manager's agent table and keyed by
/// `id` (§3, C5). Strategies are held separately by the manager, not on
/// the agent itself — see the design note on cyclic references.
#[derive(Clone, Debug)]
pub struct Agent {
    pub id: u16,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub team: TeamId,
    pub gun_angle: f32,
    pub target_gun_angle: f32,
    pub health: f32,
    pub magazine_size: u16,
    pub current_ammo: u16,
    pub reload_timer: Option<f32>,
    pub shoot_timer: f32,
    pub detected_enemies: HashSet<u16>,
    pub blocked: Option<Blocked>,
    pub time_alive: f32,
}

fn normalize_angle(mut a: f32) -> f32 {
    while a > PI {
        a -= 2.0 * PI;
    }
    while a < -PI {
        a += 2.0 * PI;
    }
    a
}

impl Agent {
    /// Bare-bones constructor for tests and ad-hoc construction; real
    /// matches spawn agents via [`Agent::spawn`].
    pub fn new(id: u16, x: f32, y: f32, radius: f32, team: TeamId) -> Self {
        Self {
            id,
            x,
            y,
            radius,
            team,
            gun_angle: 0.0,
            target_gun_angle: 0.0,
            health: 0.0,
            magazine_size: INFINITE_AMMO,
            current_ammo: INFINITE_AMMO,
            reload_timer: None,
            shoot_timer: -1.0,
            detected_enemies: HashSet::new(),
            blocked: None,
            time_alive: 0.0,
        }
    }

    /// Construct a roster agent from the configured defaults. `gun_angle`
    /// should already reflect the spawn-table facing (or the map-center
    /// default the spawn table applies when one isn't given).
    pub fn spawn(id: u16, x: f32, y: f32, team: TeamId, gun_angle: f32, cfg: &AgentConfig) -> Self {
        let magazine = cfg.magazine_size.unwrap_or(INFINITE_AMMO);
        Self {
            id,
            x,
            y,
            radius: cfg.radius,
            team,
            gun_angle,
            target_gun_angle: gun_angle,
            health: cfg.max_health,
            magazine_size: magazine,
            current_ammo: magazine,
            reload_timer: None,
            shoot_timer: -1.0,
            detected_enemies: HashSet::new(),
            blocked: None,
            time_alive: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn is_infinite_ammo(&self) -> bool {
        self.magazine_size == INFINITE_AMMO
    }

    pub fn blocked_by(&self) -> Option<Blocked> {
        self.blocked
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.health = (self.health - amount).max(0.0);
    }

    fn rotate_gun(&mut self, dt: f32, omega_max: f32) {
        let delta = normalize_angle(self.target_gun_angle - self.gun_angle);
        let step = delta.abs().min(omega_max * dt) * delta.signum();
        self.gun_angle = normalize_angle(self.gun_angle + step);
    }

    pub fn point_gun_at(&mut self, tx: f32, ty: f32) {
        self.target_gun_angle = (-(ty - self.y)).atan2(tx - self.x);
    }

    /// "Load bullet": starts the shoot-cooldown countdown; the actual
    /// bullet spawns when that countdown elapses in `tick_internal`.
    pub fn request_fire(&mut self, cfg: &AgentConfig) {
        if self.reload_timer.is_some() {
            return;
        }
        if self.is_infinite_ammo() || self.current_ammo > 0 {
            if self.shoot_timer < 0.0 {
                self.shoot_timer = cfg.shoot_cooldown;
            }
        } else {
            self.start_reload(cfg);
        }
    }

    pub fn start_reload(&mut self, cfg: &AgentConfig) {
        if self.reload_timer.is_some() || self.is_infinite_ammo() {
            return;
        }
        self.reload_timer = Some(cfg.reload_duration);
    }

    fn fire(&mut self, cfg: &AgentConfig) -> FireEvent {
        let offset = self.radius * cfg.fire_offset_ratio;
        let dx = self.gun_angle.cos();
        let dy = -self.gun_angle.sin();
        if !self.is_infinite_ammo() {
            self.current_ammo = self.current_ammo.saturating_sub(1);
            if self.current_ammo == 0 {
                self.start_reload(cfg);
            }
        }
        FireEvent {
            x: self.x + dx * offset,
            y: self.y + dy * offset,
            theta: self.gun_angle,
        }
    }

    /// Steps 1-4 of the per-tick agent update (§4.5), run before the
    /// strategy step. Returns a fire request if the cooldown elapsed
    /// this tick.
    pub fn tick_internal(&mut self, dt: f32, cfg: &AgentConfig) -> Option<FireEvent> {
        self.time_alive += dt;
        self.rotate_gun(dt, cfg.gun_rotation_speed);

        let mut fired = None;
        if self.shoot_timer >= 0.0 {
            self.shoot_timer -= dt;
            if self.shoot_timer <= 0.0 {
                // A reload that started after the shot was already counting
                // down must still suppress it (§8: no bullet while reloading).
                if self.reload_timer.is_none() {
                    fired = Some(self.fire(cfg));
                }
                self.shoot_timer = -1.0;
            }
        }

        if let Some(remaining) = self.reload_timer {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                self.current_ammo = self.magazine_size;
                self.reload_timer = None;
            } else {
                self.reload_timer = Some(remaining);
            }
        }

        fired
    }

    pub fn move_dir(
        &mut self,
        dt: f32,
        dir: Direction,
        cfg: &AgentConfig,
        agents: &BTreeMap<u16, Agent>,
        walls: &Walls,
    ) {
        let (ux, uy) = dir.unit();
        let nx = self.x + ux * cfg.speed * dt;
        let ny = self.y + uy * cfg.speed * dt;
        match validate_move(nx, ny, self.radius, agents, walls, self.id) {
            ObstacleKind::None => {
                self.x = nx;
                self.y = ny;
                self.blocked = None;
            }
            ObstacleKind::Wall => self.blocked = Some(Blocked::Wall),
            ObstacleKind::Agent(id) => self.blocked = Some(Blocked::Agent(id)),
        }
    }

    /// Deliberately coarse 4-way planner: picks the larger of `|dx|`,
    /// `|dy|` and moves one step along that axis (§4.5).
    pub fn move_toward(
        &mut self,
        dt: f32,
        tx: f32,
        ty: f32,
        cfg: &AgentConfig,
        agents: &BTreeMap<u16, Agent>,
        walls: &Walls,
    ) {
        let dx = tx - self.x;
        let dy = ty - self.y;
        let dir = if dx.abs() >= dy.abs() {
            if dx >= 0.0 {
                Direction::E
            } else {
                Direction::W
            }
        } else if dy >= 0.0 {
            Direction::N
        } else {
            Direction::S
        };
        self.move_dir(dt, dir, cfg, agents, walls);
    }

    /// FOV ray-cast (§4.3): walls block rays, agents do not. Candidates
    /// are pre-filtered to those whose center lies within `rho*r + their
    /// radius` of this agent.
    pub fn detect_enemies(&mut self, agents: &BTreeMap<u16, Agent>, walls: &Walls, fov: &FovConfig) {
        self.detected_enemies.clear();
        let max_dist = fov.rho * self.radius;

        let candidates: Vec<&Agent> = agents
            .values()
            .filter(|a| a.id != self.id && a.is_alive())
            .filter(|a| {
                let dx = a.x - self.x;
                let dy = a.y - self.y;
                let rr = max_dist + a.radius;
                dx * dx + dy * dy <= rr * rr
            })
            .collect();
        if candidates.is_empty() {
            return;
        }

        let ray_count = fov.n + 1;
        let half_phi = fov.phi / 2.0;
        let step_len = walls.cell_side() / (fov.k as f32).max(1.0);
        if step_len <= 0.0 {
            return;
        }
        let steps = (max_dist / step_len).ceil() as u32;

        for i in 0..ray_count {
            let t = if ray_count > 1 {
                i as f32 / (ray_count as f32 - 1.0)
            } else {
                0.5
            };
            let theta = self.gun_angle - half_phi + t * fov.phi;
            let dx = theta.cos();
            let dy = -theta.sin();

            for s in 1..=steps {
                let dist = s as f32 * step_len;
                if dist > max_dist {
                    break;
                }
                let px = self.x + dx * dist;
                let py = self.y + dy * dist;
                if walls.has_wall_at_pixel(px, py) {
                    break;
                }
                for cand in &candidates {
                    let ddx = px - cand.x;
                    let ddy = py - cand.y;
                    if ddx * ddx + ddy * ddy <= cand.radius * cand.radius && cand.team != self.team {
                        self.detected_enemies.insert(cand.id);
                    }
                }
            }
        }
    }

    /// Nearest currently-detected, still-alive enemy by squared distance.
    pub fn closest_enemy<'a>(&self, agents: &'a BTreeMap<u16, Agent>) -> Option<&'a Agent> {
        self.detected_enemies
            .iter()
            .filter_map(|id| agents.get(id))
            .filter(|a| a.is_alive())
            .min_by(|a, b| {
                let da = (a.x - self.x).powi(2) + (a.y - self.y).powi(2);
                let db = (b.x - self.x).powi(2) + (b.y - self.y).powi(2);
                da.partial_cmp(&db).unwrap()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> AgentConfig {
        AgentConfig {
            max_health: 100.0,
            radius: 16.0,
            speed: 100.0,
            damage: 25.0,
            shoot_cooldown: 0.8,
            magazine_size: Some(6),
            reload_duration: 1.5,
            gun_rotation_speed: 10.0,
            bullet_speed: 400.0,
            bullet_lifetime: 2.0,
            bullet_radius: 4.0,
            fire_offset_ratio: 1.5,
            detection_interval: 5,
        }
    }

    #[test]
    fn rotate_gun_steps_toward_target_without_overshoot() {
        let mut a = Agent::spawn(1, 0.0, 0.0, TeamId::A, 0.0, &cfg());
        a.target_gun_angle = PI / 2.0;
        a.tick_internal(0.05, &cfg());
        assert!(a.gun_angle > 0.0 && a.gun_angle < PI / 2.0);
    }

    #[test]
    fn request_fire_then_tick_fires_after_cooldown() {
        let mut a = Agent::spawn(1, 0.0, 0.0, TeamId::A, 0.0, &cfg());
        let c = cfg();
        a.request_fire(&c);
        assert!(a.tick_internal(0.5, &c).is_none());
        assert!(a.tick_internal(0.5, &c).is_some());
        assert_eq!(a.current_ammo, 5);
    }

    #[test]
    fn reload_starts_when_magazine_empty_after_fire() {
        let mut a = Agent::spawn(1, 0.0, 0.0, TeamId::A, 0.0, &cfg());
        let c = cfg();
        a.current_ammo = 1;
        a.request_fire(&c);
        a.tick_internal(c.shoot_cooldown, &c);
        assert_eq!(a.current_ammo, 0);
        assert!(a.reload_timer.is_some());
    }

    #[test]
    fn request_fire_while_reloading_is_ignored() {
        let mut a = Agent::spawn(1, 0.0, 0.0, TeamId::A, 0.0, &cfg());
        let c = cfg();
        a.reload_timer = Some(1.0);
        a.request_fire(&c);
        assert_eq!(a.shoot_timer, -1.0);
    }

    #[test]
    fn reload_started_mid_cooldown_suppresses_the_pending_shot() {
        let mut a = Agent::spawn(1, 0.0, 0.0, TeamId::A, 0.0, &cfg());
        let c = cfg();
        a.request_fire(&c);
        // Reload begins while the shot is still counting down.
        a.reload_timer = Some(c.reload_duration);
        let ammo_before = a.current_ammo;
        let fired = a.tick_internal(c.shoot_cooldown, &c);
        assert!(fired.is_none());
        assert_eq!(a.current_ammo, ammo_before);
    }

    #[test]
    fn infinite_ammo_never_reloads() {
        let mut c = cfg();
        c.magazine_size = None;
        let mut a = Agent::spawn(1, 0.0, 0.0, TeamId::A, 0.0, &c);
        a.request_fire(&c);
        a.tick_internal(c.shoot_cooldown, &c);
        assert!(a.reload_timer.is_none());
        assert_eq!(a.current_ammo, INFINITE_AMMO);
    }

    #[test]
    fn move_into_wall_leaves_position_unchanged() {
        let c = cfg();
        let mut walls = Walls::new(10, 10, 32.0);
        walls.add_wall(4, 3, false);
        // agent sits just west of the wall cell and tries to step east into it
        let mut a = Agent::spawn(1, 110.0, 100.0, TeamId::A, 0.0, &c);
        let agents = BTreeMap::new();
        a.move_dir(1.0, Direction::E, &c, &agents, &walls);
        assert_eq!(a.blocked, Some(Blocked::Wall));
        assert_eq!(a.x, 110.0);
    }

    #[test]
    fn take_damage_clamps_at_zero() {
        let mut a = Agent::spawn(1, 0.0, 0.0, TeamId::A, 0.0, &cfg());
        a.take_damage(1000.0);
        assert_eq!(a.health, 0.0);
        assert!(!a.is_alive());
    }

    #[test]
    fn wall_blocks_detection_but_removing_it_restores_detection() {
        let c = cfg();
        let mut walls = Walls::new(20, 20, 32.0);
        for cy in 2..=3 {
            walls.add_wall(9, cy, false);
        }
        let fov = FovConfig { rho: 25.0, phi: 0.6, n: 4, k: 2 };
        let mut a = Agent::spawn(1, 100.0, 100.0, TeamId::A, 0.0, &c);
        let mut enemy = Agent::spawn(2, 500.0, 100.0, TeamId::B, PI, &c);
        let mut agents = BTreeMap::new();
        agents.insert(enemy.id, enemy.clone());
        a.detect_enemies(&agents, &walls, &fov);
        assert!(!a.detected_enemies.contains(&2));

        walls.remove_wall(9, 2, false);
        walls.remove_wall(9, 3, false);
        enemy.x = 500.0;
        agents.insert(enemy.id, enemy);
        a.detect_enemies(&agents, &walls, &fov);
        assert!(a.detected_enemies.contains(&2));
    }
}

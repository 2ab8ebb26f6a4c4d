//! Strategy interface (C6) and stock policies (§4.6).
//!
//! A Strategy is a stateful object invoked once per tick via
//! `step(ctx, dt)`. It only ever touches the agent it owns through
//! `AgentCtx` — never a back-pointer into the manager's tables,
//! matching the "plain value + context parameter" design note (§9).

use std::collections::BTreeMap;

use arena_proto::{TeamId, ZoneStatus};
use rand::Rng;

use crate::agent::{Agent, Direction};
use crate::config::AgentConfig;
use crate::walls::Walls;

/// Read-only KOTH state made available to strategies running in that
/// mode. Not part of the core agent/world tables — an additive
/// extension beyond the plain `(agents, walls)` context, needed
/// because the zone-hold policy has nothing else to aim at.
#[derive(Clone, Copy, Debug)]
pub struct KothHint {
    pub zone_status: ZoneStatus,
    pub zone_center: (f32, f32),
}

/// Read-only CTF state made available to strategies running in that
/// mode, for the same reason as [`KothHint`].
#[derive(Clone, Copy, Debug)]
pub struct CtfHint {
    pub own_base: (f32, f32),
    pub enemy_base: (f32, f32),
    pub enemy_flag_pos: (f32, f32),
    pub enemy_flag_carried_by_me: bool,
    pub own_flag_out: bool,
}

/// The per-tick view and action surface a Strategy consumes (§4.6).
/// `me` is temporarily removed from the manager's agent table for the
/// duration of the call, so `others` never aliases it.
pub struct AgentCtx<'a> {
    pub me: &'a mut Agent,
    pub others: &'a BTreeMap<u16, Agent>,
    pub walls: &'a Walls,
    pub cfg: &'a AgentConfig,
    pub koth: Option<KothHint>,
    pub ctf: Option<CtfHint>,
}

impl<'a> AgentCtx<'a> {
    pub fn move_dir(&mut self, dt: f32, dir: Direction) {
        self.me.move_dir(dt, dir, self.cfg, self.others, self.walls);
    }

    pub fn move_toward(&mut self, dt: f32, tx: f32, ty: f32) {
        self.me.move_toward(dt, tx, ty, self.cfg, self.others, self.walls);
    }

    pub fn point_gun_at(&mut self, tx: f32, ty: f32) {
        self.me.point_gun_at(tx, ty);
    }

    pub fn request_fire(&mut self) {
        self.me.request_fire(self.cfg);
    }

    pub fn start_reload(&mut self) {
        self.me.start_reload(self.cfg);
    }

    pub fn closest_enemy(&self) -> Option<&Agent> {
        self.me.closest_enemy(self.others)
    }
}

/// `step(agent, dt)` — the only method a Strategy exposes (§4.6). No
/// ordering guarantees are made across agents within a tick.
pub trait Strategy: Send {
    fn step(&mut self, ctx: &mut AgentCtx, dt: f32);
}

/// Wander in the current heading, turning to a new random one every
/// couple of seconds; fire at any detected enemy.
#[derive(Debug, Default)]
pub struct RandomWalkShoot {
    heading_timer: f32,
    heading: u8,
}

const DIRECTIONS: [Direction; 8] = [
    Direction::N,
    Direction::Ne,
    Direction::E,
    Direction::Se,
    Direction::S,
    Direction::Sw,
    Direction::W,
    Direction::Nw,
];

impl Strategy for RandomWalkShoot {
    fn step(&mut self, ctx: &mut AgentCtx, dt: f32) {
        self.heading_timer -= dt;
        if self.heading_timer <= 0.0 {
            self.heading = rand::rng().random_range(0..8);
            self.heading_timer = 2.0;
        }
        ctx.move_dir(dt, DIRECTIONS[self.heading as usize]);

        if let Some(enemy) = ctx.closest_enemy() {
            let (ex, ey) = (enemy.x, enemy.y);
            ctx.point_gun_at(ex, ey);
            ctx.request_fire();
        }
    }
}

/// Rushes the nearest detected enemy, strafing sideways while
/// approaching, and reloads proactively once ammo runs low.
#[derive(Debug, Default)]
pub struct RushStrafeReload {
    strafe_timer: f32,
    strafe_right: bool,
}

impl Strategy for RushStrafeReload {
    fn step(&mut self, ctx: &mut AgentCtx, dt: f32) {
        self.strafe_timer -= dt;
        if self.strafe_timer <= 0.0 {
            self.strafe_right = !self.strafe_right;
            self.strafe_timer = 0.6;
        }

        if !ctx.me.is_infinite_ammo() && ctx.me.current_ammo == 0 {
            ctx.start_reload();
        }

        if let Some(enemy) = ctx.closest_enemy() {
            let (ex, ey) = (enemy.x, enemy.y);
            ctx.point_gun_at(ex, ey);
            ctx.request_fire();
            let dx = ex - ctx.me.x;
            let dy = ey - ctx.me.y;
            let forward = if dx.abs() >= dy.abs() {
                if dx >= 0.0 { Direction::E } else { Direction::W }
            } else if dy >= 0.0 {
                Direction::N
            } else {
                Direction::S
            };
            ctx.move_dir(dt, forward);
        } else {
            let dir = if self.strafe_right { Direction::E } else { Direction::W };
            ctx.move_dir(dt, dir);
        }
    }
}

/// Holds the KOTH zone: walks to its center and fires at anyone inside
/// detection range.
#[derive(Debug, Default)]
pub struct ZoneHoldKoth;

impl Strategy for ZoneHoldKoth {
    fn step(&mut self, ctx: &mut AgentCtx, dt: f32) {
        if let Some(koth) = ctx.koth {
            let (zx, zy) = koth.zone_center;
            ctx.move_toward(dt, zx, zy);
        }
        if let Some(enemy) = ctx.closest_enemy() {
            let (ex, ey) = (enemy.x, enemy.y);
            ctx.point_gun_at(ex, ey);
            ctx.request_fire();
        }
    }
}

/// Re-selects a CTF role every tick from the flag hint: carry the
/// enemy flag home if holding it, hunt the enemy carrier if the own
/// flag is out, otherwise push toward the enemy flag as an attacker.
/// (`escort` and `base-defender` degenerate to holding position near
/// the relevant base when no more specific objective exists.)
#[derive(Debug, Default)]
pub struct CtfRolePolicy;

impl Strategy for CtfRolePolicy {
    fn step(&mut self, ctx: &mut AgentCtx, dt: f32) {
        let Some(ctf) = ctx.ctf else { return };

        if ctf.enemy_flag_carried_by_me {
            let (hx, hy) = ctf.own_base;
            ctx.move_toward(dt, hx, hy);
        } else if ctf.own_flag_out {
            if let Some(enemy) = ctx.closest_enemy() {
                let (ex, ey) = (enemy.x, enemy.y);
                ctx.point_gun_at(ex, ey);
                ctx.request_fire();
                ctx.move_toward(dt, ex, ey);
            } else {
                let (bx, by) = ctf.own_base;
                ctx.move_toward(dt, bx, by);
            }
        } else {
            let (fx, fy) = ctf.enemy_flag_pos;
            ctx.move_toward(dt, fx, fy);
        }

        if let Some(enemy) = ctx.closest_enemy() {
            let (ex, ey) = (enemy.x, enemy.y);
            ctx.point_gun_at(ex, ey);
            ctx.request_fire();
        }
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
            magazine_size: None,
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
    fn random_walk_moves_every_tick() {
        let c = cfg();
        let walls = Walls::new(20, 20, 32.0);
        let others = BTreeMap::new();
        let mut me = Agent::spawn(1, 100.0, 100.0, TeamId::A, 0.0, &c);
        let mut ctx = AgentCtx { me: &mut me, others: &others, walls: &walls, cfg: &c, koth: None, ctf: None };
        let mut policy = RandomWalkShoot::default();
        let before = (ctx.me.x, ctx.me.y);
        policy.step(&mut ctx, 0.1);
        assert_ne!(before, (ctx.me.x, ctx.me.y));
    }

    #[test]
    fn zone_hold_walks_toward_zone_center() {
        let c = cfg();
        let walls = Walls::new(20, 20, 32.0);
        let others = BTreeMap::new();
        let mut me = Agent::spawn(1, 0.0, 0.0, TeamId::A, 0.0, &c);
        let mut ctx = AgentCtx {
            me: &mut me,
            others: &others,
            walls: &walls,
            cfg: &c,
            koth: Some(KothHint { zone_status: ZoneStatus::Neutral, zone_center: (100.0, 0.0) }),
            ctf: None,
        };
        let mut policy = ZoneHoldKoth;
        policy.step(&mut ctx, 0.1);
        assert!(ctx.me.x > 0.0);
    }
}

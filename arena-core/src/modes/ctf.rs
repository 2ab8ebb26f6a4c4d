use std::collections::BTreeMap;

use arena_proto::{encode_frame, pack_ctf_state, CtfFlagJson, CtfStateJson, MessageType, TeamId};

use crate::agent::Agent;
use crate::modes::ModeOverlay;
use crate::strategy::CtfHint;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FlagState {
    AtBase,
    Carried,
    Dropped,
}

#[derive(Clone, Copy, Debug)]
struct Flag {
    base_x: f32,
    base_y: f32,
    x: f32,
    y: f32,
    state: FlagState,
    carrier: Option<u16>,
    drop_timer: f32,
}

impl Flag {
    fn new(base_x: f32, base_y: f32) -> Self {
        Self { base_x, base_y, x: base_x, y: base_y, state: FlagState::AtBase, carrier: None, drop_timer: 0.0 }
    }

    fn reset(&mut self) {
        self.x = self.base_x;
        self.y = self.base_y;
        self.state = FlagState::AtBase;
        self.carrier = None;
        self.drop_timer = 0.0;
    }

    fn to_json(self) -> CtfFlagJson {
        CtfFlagJson { x: self.x, y: self.y, carrier: self.carrier, at_base: self.state == FlagState::AtBase }
    }
}

#[derive(Clone, Debug)]
pub struct CtfConfig {
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

#[derive(Clone, Debug)]
pub struct CtfOverlay {
    flag_a: Flag,
    flag_b: Flag,
    captures_a: u32,
    captures_b: u32,
    time_elapsed: f32,
    game_over: bool,
    winner: TeamId,
    cfg: CtfConfig,
}

impl CtfOverlay {
    pub fn new(cfg: CtfConfig) -> Self {
        let flag_a = Flag::new(cfg.base_a.0, cfg.base_a.1);
        let flag_b = Flag::new(cfg.base_b.0, cfg.base_b.1);
        Self { flag_a, flag_b, captures_a: 0, captures_b: 0, time_elapsed: 0.0, game_over: false, winner: TeamId::Neutral, cfg }
    }

    pub fn snapshot(&self) -> CtfStateJson {
        CtfStateJson {
            team_a_captures: self.captures_a,
            team_b_captures: self.captures_b,
            flag_team_a: self.flag_a.to_json(),
            flag_team_b: self.flag_b.to_json(),
            time_elapsed: self.time_elapsed,
            max_time: self.cfg.max_duration,
            max_captures: self.cfg.max_captures,
            game_over: self.game_over,
            winner_team: match self.winner {
                TeamId::Neutral => "neutral".to_string(),
                TeamId::A => "a".to_string(),
                TeamId::B => "b".to_string(),
            },
        }
    }

    /// If a flag's carrier is gone (died or disconnected), either drop
    /// it in place (when `drops_on_death`) or return it straight to
    /// base.
    fn track_carrier(flag: &mut Flag, agents: &BTreeMap<u16, Agent>, drops_on_death: bool) {
        if flag.state != FlagState::Carried {
            return;
        }
        match flag.carrier.and_then(|id| agents.get(&id)).filter(|a| a.is_alive()) {
            Some(carrier) => {
                flag.x = carrier.x;
                flag.y = carrier.y;
            }
            None if drops_on_death => {
                flag.state = FlagState::Dropped;
                flag.carrier = None;
                flag.drop_timer = 0.0;
            }
            None => flag.reset(),
        }
    }

    fn auto_return(flag: &mut Flag, dt: f32, auto_return_time: f32) {
        if flag.state == FlagState::Dropped {
            flag.drop_timer += dt;
            if flag.drop_timer >= auto_return_time {
                flag.reset();
            }
        }
    }

    /// Own-flag return takes priority over picking up the enemy flag
    /// in the same tick; pickup of `AT_BASE` or `DROPPED` enemy flags
    /// is atomic.
    fn pickups_and_returns(&mut self, agents: &BTreeMap<u16, Agent>) {
        let pr2 = self.cfg.pickup_radius * self.cfg.pickup_radius;
        for (&id, agent) in agents.iter() {
            if !agent.is_alive() {
                continue;
            }
            match agent.team {
                TeamId::A => {
                    if self.flag_a.state == FlagState::Dropped {
                        let dx = agent.x - self.flag_a.x;
                        let dy = agent.y - self.flag_a.y;
                        if dx * dx + dy * dy <= pr2 {
                            self.flag_a.reset();
                            continue;
                        }
                    }
                    if matches!(self.flag_b.state, FlagState::AtBase | FlagState::Dropped) {
                        let dx = agent.x - self.flag_b.x;
                        let dy = agent.y - self.flag_b.y;
                        if dx * dx + dy * dy <= pr2 {
                            self.flag_b.state = FlagState::Carried;
                            self.flag_b.carrier = Some(id);
                            self.flag_b.drop_timer = 0.0;
                        }
                    }
                }
                TeamId::B => {
                    if self.flag_b.state == FlagState::Dropped {
                        let dx = agent.x - self.flag_b.x;
                        let dy = agent.y - self.flag_b.y;
                        if dx * dx + dy * dy <= pr2 {
                            self.flag_b.reset();
                            continue;
                        }
                    }
                    if matches!(self.flag_a.state, FlagState::AtBase | FlagState::Dropped) {
                        let dx = agent.x - self.flag_a.x;
                        let dy = agent.y - self.flag_a.y;
                        if dx * dx + dy * dy <= pr2 {
                            self.flag_a.state = FlagState::Carried;
                            self.flag_a.carrier = Some(id);
                            self.flag_a.drop_timer = 0.0;
                        }
                    }
                }
                TeamId::Neutral => {}
            }
        }
    }

    /// Capture requires the carrier to be within `return_radius` of
    /// their own base AND their own flag to be `AT_BASE` — the key
    /// CTF invariant (§4.8, §8 scenario 4).
    fn captures(&mut self, agents: &BTreeMap<u16, Agent>) {
        let rr2 = self.cfg.return_radius * self.cfg.return_radius;
        for agent in agents.values().filter(|a| a.is_alive()) {
            match agent.team {
                TeamId::A => {
                    if self.flag_b.carrier != Some(agent.id) {
                        continue;
                    }
                    let (bx, by) = (self.flag_a.base_x, self.flag_a.base_y);
                    let dx = agent.x - bx;
                    let dy = agent.y - by;
                    if dx * dx + dy * dy <= rr2 && self.flag_a.state == FlagState::AtBase {
                        self.captures_a += self.cfg.points_per_capture;
                        self.flag_b.reset();
                    }
                }
                TeamId::B => {
                    if self.flag_a.carrier != Some(agent.id) {
                        continue;
                    }
                    let (bx, by) = (self.flag_b.base_x, self.flag_b.base_y);
                    let dx = agent.x - bx;
                    let dy = agent.y - by;
                    if dx * dx + dy * dy <= rr2 && self.flag_b.state == FlagState::AtBase {
                        self.captures_b += self.cfg.points_per_capture;
                        self.flag_a.reset();
                    }
                }
                TeamId::Neutral => {}
            }
        }
    }
}

impl ModeOverlay for CtfOverlay {
    fn tick(&mut self, dt: f32, agents: &BTreeMap<u16, Agent>) -> Option<TeamId> {
        if self.game_over {
            return Some(self.winner);
        }
        self.time_elapsed += dt;

        Self::track_carrier(&mut self.flag_a, agents, self.cfg.drops_on_death);
        Self::track_carrier(&mut self.flag_b, agents, self.cfg.drops_on_death);

        self.pickups_and_returns(agents);
        self.captures(agents);

        Self::auto_return(&mut self.flag_a, dt, self.cfg.auto_return_time);
        Self::auto_return(&mut self.flag_b, dt, self.cfg.auto_return_time);

        if self.captures_a >= self.cfg.max_captures {
            self.game_over = true;
            self.winner = TeamId::A;
        } else if self.captures_b >= self.cfg.max_captures {
            self.game_over = true;
            self.winner = TeamId::B;
        } else if self.time_elapsed >= self.cfg.max_duration {
            self.game_over = true;
            self.winner = match self.captures_a.cmp(&self.captures_b) {
                std::cmp::Ordering::Greater => TeamId::A,
                std::cmp::Ordering::Less => TeamId::B,
                std::cmp::Ordering::Equal => TeamId::Neutral,
            };
        }

        if self.game_over {
            Some(self.winner)
        } else {
            None
        }
    }

    fn encode_broadcast(&self) -> Option<Vec<u8>> {
        let payload = pack_ctf_state(&self.snapshot()).ok()?;
        Some(encode_frame(MessageType::CtfState, &payload))
    }

    fn ctf_hint(&self, agent: &Agent) -> Option<CtfHint> {
        match agent.team {
            TeamId::A => Some(CtfHint {
                own_base: self.cfg.base_a,
                enemy_base: self.cfg.base_b,
                enemy_flag_pos: (self.flag_b.x, self.flag_b.y),
                enemy_flag_carried_by_me: self.flag_b.carrier == Some(agent.id),
                own_flag_out: self.flag_a.state != FlagState::AtBase,
            }),
            TeamId::B => Some(CtfHint {
                own_base: self.cfg.base_b,
                enemy_base: self.cfg.base_a,
                enemy_flag_pos: (self.flag_a.x, self.flag_a.y),
                enemy_flag_carried_by_me: self.flag_a.carrier == Some(agent.id),
                own_flag_out: self.flag_b.state != FlagState::AtBase,
            }),
            TeamId::Neutral => None,
        }
    }
}

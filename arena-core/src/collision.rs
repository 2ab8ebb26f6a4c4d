use std::collections::BTreeMap;

use crate::agent::Agent;
use crate::walls::Walls;

/// What stopped a `validateMove` attempt (§4.3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObstacleKind {
    None,
    Wall,
    Agent(u16),
}

/// Cell-bounded wall test: true if any cell under the circle's bounding
/// box is a wall. Approximate by design — not true circle/square
/// intersection; do not upgrade (§4.3).
pub fn circle_vs_walls(x: f32, y: f32, r: f32, walls: &Walls) -> bool {
    let cols = walls.cols();
    let rows = walls.rows();
    if cols == 0 || rows == 0 {
        return false;
    }
    let cell = walls.cell_side();
    let cell_of = |v: f32, max: u16| -> u16 {
        if v < 0.0 {
            0
        } else {
            ((v / cell) as u16).min(max - 1)
        }
    };
    let cx0 = cell_of(x - r, cols);
    let cx1 = cell_of(x + r, cols);
    let cy0 = cell_of(y - r, rows);
    let cy1 = cell_of(y + r, rows);
    for cx in cx0..=cx1 {
        for cy in cy0..=cy1 {
            if walls.has_wall(cx, cy) {
                return true;
            }
        }
    }
    false
}

pub fn circles_overlap(x1: f32, y1: f32, r1: f32, x2: f32, y2: f32, r2: f32) -> bool {
    let dx = x1 - x2;
    let dy = y1 - y2;
    let rr = r1 + r2;
    dx * dx + dy * dy < rr * rr
}

/// Walls are checked first, then agents; bullets are never obstacles
/// for movement (§4.3).
pub fn validate_move(
    x: f32,
    y: f32,
    r: f32,
    agents: &BTreeMap<u16, Agent>,
    walls: &Walls,
    exclude_id: u16,
) -> ObstacleKind {
    if circle_vs_walls(x, y, r, walls) {
        return ObstacleKind::Wall;
    }
    for (&id, other) in agents.iter() {
        if id == exclude_id {
            continue;
        }
        if circles_overlap(x, y, r, other.x, other.y, other.radius) {
            return ObstacleKind::Agent(id);
        }
    }
    ObstacleKind::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_proto::TeamId;

    fn agent_at(id: u16, x: f32, y: f32, r: f32) -> Agent {
        let mut a = Agent::new(id, x, y, r, TeamId::A);
        a.health = 100.0;
        a
    }

    #[test]
    fn circles_overlap_detects_touching_circles() {
        assert!(circles_overlap(0.0, 0.0, 5.0, 8.0, 0.0, 5.0));
        assert!(!circles_overlap(0.0, 0.0, 5.0, 20.0, 0.0, 5.0));
    }

    #[test]
    fn circle_vs_walls_detects_occupied_cell_in_bounding_box() {
        let mut walls = Walls::new(10, 10, 32.0);
        walls.add_wall(3, 3, false);
        assert!(circle_vs_walls(100.0, 100.0, 16.0, &walls));
        assert!(!circle_vs_walls(500.0, 500.0, 16.0, &walls));
    }

    #[test]
    fn validate_move_prefers_wall_over_agent() {
        let mut walls = Walls::new(10, 10, 32.0);
        walls.add_wall(3, 3, false);
        let mut agents = BTreeMap::new();
        agents.insert(1, agent_at(1, 100.0, 100.0, 16.0));
        let kind = validate_move(100.0, 100.0, 16.0, &agents, &walls, 2);
        assert_eq!(kind, ObstacleKind::Wall);
    }

    #[test]
    fn validate_move_reports_blocking_agent_id() {
        let walls = Walls::new(10, 10, 32.0);
        let mut agents = BTreeMap::new();
        agents.insert(1, agent_at(1, 100.0, 100.0, 16.0));
        let kind = validate_move(105.0, 100.0, 16.0, &agents, &walls, 2);
        assert_eq!(kind, ObstacleKind::Agent(1));
    }

    #[test]
    fn validate_move_excludes_self() {
        let walls = Walls::new(10, 10, 32.0);
        let mut agents = BTreeMap::new();
        agents.insert(7, agent_at(7, 100.0, 100.0, 16.0));
        let kind = validate_move(100.0, 100.0, 16.0, &agents, &walls, 7);
        assert_eq!(kind, ObstacleKind::None);
    }
}

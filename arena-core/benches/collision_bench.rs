use std::collections::BTreeMap;

use arena_core::{validate_move, Agent, Walls};
use arena_proto::TeamId;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn walls_with_scatter(cols: u16, rows: u16, cell: f32) -> Walls {
    let mut walls = Walls::new(cols, rows, cell);
    for cx in (0..cols).step_by(3) {
        for cy in (0..rows).step_by(5) {
            walls.add_wall(cx, cy, false);
        }
    }
    walls
}

fn agent_table(n: u16) -> BTreeMap<u16, Agent> {
    (0..n)
        .map(|id| {
            let team = if id % 2 == 0 { TeamId::A } else { TeamId::B };
            let mut a = Agent::new(id, (id as f32) * 17.0, (id as f32) * 11.0, 16.0, team);
            a.health = 100.0;
            (id, a)
        })
        .collect()
}

fn bench_validate_move(c: &mut Criterion) {
    let walls = walls_with_scatter(64, 64, 32.0);
    let agents = agent_table(64);
    c.bench_function("validate_move_64_agents", |b| {
        b.iter(|| validate_move(black_box(512.0), black_box(512.0), black_box(16.0), &agents, &walls, 9999))
    });
}

criterion_group!(benches, bench_validate_move);
criterion_main!(benches);

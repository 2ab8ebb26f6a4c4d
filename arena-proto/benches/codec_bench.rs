use arena_proto::{pack_entities, unpack_entities, EntityRecord, TeamId};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sample_entities(n: u16) -> Vec<EntityRecord> {
    (0..n)
        .map(|id| EntityRecord {
            id,
            x: id as f32,
            y: (id as f32) * 2.0,
            radius: 16.0,
            gun_angle: 0.0,
            team: if id % 2 == 0 { TeamId::A } else { TeamId::B },
            health: 100.0,
            ammo: 30,
        })
        .collect()
}

fn bench_pack_unpack(c: &mut Criterion) {
    let entities = sample_entities(64);
    c.bench_function("pack_entities_64", |b| {
        b.iter(|| pack_entities(black_box(&entities)).unwrap())
    });
    let packed = pack_entities(&entities).unwrap();
    c.bench_function("unpack_entities_64", |b| {
        b.iter(|| unpack_entities(black_box(&packed)).unwrap())
    });
}

criterion_group!(benches, bench_pack_unpack);
criterion_main!(benches);

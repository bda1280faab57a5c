use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use machine_sim::{SimConfig, SimWorld};

const DT: f32 = 1.0 / 30.0;

fn populated_world(machines: u32) -> SimWorld {
    let mut sim = SimWorld::with_config(SimConfig {
        rng_seed: 1,
        ..Default::default()
    });

    let player = sim.spawn_player(0, 0.0, 0.0);
    let _ = player;

    // Mixed population spread over a 200x200 area.
    for i in 0..machines {
        let x = (i % 20) as f32 * 10.0 - 100.0;
        let y = (i / 20) as f32 * 10.0 - 100.0;
        let id = i + 1;
        match i % 3 {
            0 => {
                sim.spawn_stalker(id, x, y).ok();
            }
            1 => {
                sim.spawn_grazer(id, x, y).ok();
            }
            _ => {
                sim.spawn_warboat(id, x, y).ok();
            }
        }
        sim.set_enemy(id, 0);
    }

    // Warm up so brains are past their initial transitions.
    for _ in 0..10 {
        sim.step(DT);
    }
    sim
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("sim_step");
    for count in [30u32, 120, 480] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut sim = populated_world(count);
            b.iter(|| sim.step(DT));
        });
    }
    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let mut sim = populated_world(480);
    c.bench_function("snapshot_json_480", |b| {
        b.iter(|| sim.snapshot_json());
    });
}

criterion_group!(benches, bench_step, bench_snapshot);
criterion_main!(benches);

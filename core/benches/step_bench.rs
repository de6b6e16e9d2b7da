/// Criterion benchmarks for the memory step.
///
/// Measures single-step latency across a slot-count sweep and segment
/// replay throughput at a fixed shape.
///
/// Run: cargo bench --bench step_bench
/// Reports saved to: target/criterion/

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use mnemosyne_core::interface::interface_width;
use mnemosyne_core::model::DncConfig;
use mnemosyne_core::state::MemoryState;
use mnemosyne_core::step::{step, step_sequence};
use mnemosyne_core::tensor::SimpleRng;

fn make_interface(cfg: &DncConfig, batch: usize, steps: usize, seed: u64) -> Vec<f32> {
    let mut rng = SimpleRng::new(seed);
    let mut raw = vec![0.0f32; steps * batch * interface_width(cfg)];
    rng.fill_uniform(&mut raw, 1.0);
    raw
}

/// Single-step latency across the slot-count sweep.
fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");
    for slots in [64, 128, 256] {
        let cfg = DncConfig::new(slots, 32, 4);
        let state = MemoryState::reset(&cfg, 1);
        let raw = make_interface(&cfg, 1, 1, 42);

        group.bench_with_input(BenchmarkId::new("slots", slots), &slots, |b, _| {
            b.iter(|| step(&cfg, &state, &raw).unwrap());
        });
    }
    group.finish();
}

/// Batched stepping: the batch dimension is the parallelism surface.
fn bench_step_batched(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_batched");
    let cfg = DncConfig::new(128, 32, 4);
    for batch in [1, 8, 32] {
        let state = MemoryState::reset(&cfg, batch);
        let raw = make_interface(&cfg, batch, 1, 7);

        group.bench_with_input(BenchmarkId::new("batch", batch), &batch, |b, _| {
            b.iter(|| step(&cfg, &state, &raw).unwrap());
        });
    }
    group.finish();
}

/// Segment replay: the truncated-BPTT burn-in path.
fn bench_segment_replay(c: &mut Criterion) {
    let cfg = DncConfig::new(128, 32, 4);
    let state = MemoryState::reset(&cfg, 1);
    let steps = 16;
    let raw = make_interface(&cfg, 1, steps, 11);

    c.bench_function("segment_replay_16", |b| {
        b.iter(|| step_sequence(&cfg, &state, &raw, steps).unwrap());
    });
}

criterion_group!(benches, bench_step, bench_step_batched, bench_segment_replay);
criterion_main!(benches);

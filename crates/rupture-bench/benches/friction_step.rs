//! Criterion benchmarks for one friction step over an interior layer.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rupture_bench::{fault_profile, AGING_PROFILE, LSW_PROFILE};
use rupture_core::Layer;
use rupture_friction::StressInput;

fn bench_friction_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("friction_step");
    for (name, profile) in [("aging", AGING_PROFILE), ("linear_slip_weakening", LSW_PROFILE)] {
        for faces in [256usize, 4096] {
            let (rupture, mut store) = fault_profile(profile, faces).unwrap();
            let stress = StressInput::zeros(faces, store.quadrature_points());
            let mut time = 0.0;
            group.bench_with_input(BenchmarkId::new(name, faces), &faces, |b, _| {
                b.iter(|| {
                    let summary = rupture
                        .step(&mut store, Layer::Interior, &stress, time, 1e-4)
                        .unwrap();
                    time += 1e-4;
                    black_box(summary);
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_friction_step);
criterion_main!(benches);

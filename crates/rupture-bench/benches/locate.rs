//! Criterion benchmarks for point location on a structured tetrahedral mesh.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rupture_bench::{grid_points, structured_mesh};
use rupture_mesh::{deduplicate_ownership, find_mesh_ids, Locator};

fn bench_locate(c: &mut Criterion) {
    let mut group = c.benchmark_group("locate");
    for n in [4u32, 12] {
        let mesh = structured_mesh(n).unwrap();
        let points = grid_points(1000);
        group.bench_with_input(BenchmarkId::new("find_mesh_ids", n), &n, |b, _| {
            b.iter(|| black_box(find_mesh_ids(black_box(&points), &mesh)));
        });
        group.bench_with_input(BenchmarkId::new("locate_one", n), &n, |b, _| {
            let locator = Locator::new();
            b.iter(|| black_box(locator.locate_one(black_box(points[500]), &mesh)));
        });
    }
    group.finish();
}

fn bench_dedup(c: &mut Criterion) {
    let claims: Vec<Vec<bool>> = (0..8)
        .map(|rank| (0..10_000).map(|p| (p + rank) % 3 != 0).collect())
        .collect();
    c.bench_function("deduplicate_ownership_8x10k", |b| {
        b.iter(|| black_box(deduplicate_ownership(black_box(&claims)).unwrap()));
    });
}

criterion_group!(benches, bench_locate, bench_dedup);
criterion_main!(benches);

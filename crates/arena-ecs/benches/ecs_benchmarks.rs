//! Store churn and spatial query benchmarks.
//!
//! Run with: `cargo bench --bench ecs_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use arena_ecs::prelude::*;

#[derive(Default)]
struct Body {
    x: f32,
    y: f32,
}

/// Scatter `count` entities over a 10k x 10k field on a fixed lattice.
fn populated(count: usize) -> (EntityStore<Body>, SpatialHash) {
    let mut store = EntityStore::with_capacity(count);
    let mut grid = SpatialHash::new(200.0);
    for i in 0..count {
        let (id, body) = store.alloc().expect("capacity sized to count");
        body.x = (i * 7919 % 10_000) as f32;
        body.y = (i * 104_729 % 10_000) as f32;
        grid.insert(id, body.x, body.y);
    }
    (store, grid)
}

fn bench_spatial_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial_query");
    for count in [1_000usize, 10_000] {
        let (_store, grid) = populated(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &grid, |b, grid| {
            b.iter(|| {
                let mut hits = 0usize;
                grid.query(black_box(5_000.0), black_box(5_000.0), 300.0, 300.0, |_| hits += 1);
                hits
            })
        });
    }
    group.finish();
}

fn bench_spatial_refresh(c: &mut Criterion) {
    let (store, mut grid) = populated(10_000);
    let ids = store.ids();
    let mut offset = 0.0f32;
    c.bench_function("spatial_refresh_10k", |b| {
        b.iter(|| {
            offset += 1.5;
            for &id in &ids {
                if let Some(body) = store.get(id) {
                    grid.update(id, body.x + offset, body.y);
                }
            }
        })
    });
}

fn bench_store_churn(c: &mut Criterion) {
    c.bench_function("store_alloc_delete_reclaim_1k", |b| {
        let mut store = EntityStore::<Body>::with_capacity(1_000);
        b.iter(|| {
            for _ in 0..1_000 {
                let (id, _) = store.alloc().expect("reclaimed every iteration");
                store.request_delete(id);
            }
            black_box(store.reclaim().len())
        })
    });
}

criterion_group!(benches, bench_spatial_query, bench_spatial_refresh, bench_store_churn);
criterion_main!(benches);

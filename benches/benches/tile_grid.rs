// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Size, Vec2};
use understory_tile_grid::{GridSpec, VisibleSet, compute_visible_range};

fn grid(items: usize) -> GridSpec {
    GridSpec::new(15, 200.0, 20.0, items).unwrap()
}

fn bench_compute_visible_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("tile_grid/compute_visible_range");
    for (label, viewport) in [
        ("phone", Size::new(390.0, 844.0)),
        ("desktop", Size::new(1920.0, 1080.0)),
        ("wall", Size::new(7680.0, 4320.0)),
    ] {
        let spec = grid(10_000);
        group.bench_with_input(BenchmarkId::new("to_set", label), &viewport, |b, viewport| {
            let mut step = 0.0;
            b.iter(|| {
                step += 1.0;
                let offset = Vec2::new(-(step % 2_000.0), -(step * 3.0 % 100_000.0));
                let range = compute_visible_range(offset, *viewport, &spec, 1);
                black_box(range.to_set())
            });
        });
    }
    group.finish();
}

fn bench_reconcile_drag(c: &mut Criterion) {
    let mut group = c.benchmark_group("tile_grid/reconcile");
    let spec = grid(10_000);
    let viewport = Size::new(1920.0, 1080.0);

    // A continuous vertical drag, reconciled every half cell.
    for frames in [64_usize, 512] {
        let offsets: Vec<Vec2> = (0..frames)
            .map(|i| Vec2::new(-120.0, -100.0 * i as f64))
            .collect();
        group.throughput(Throughput::Elements(frames as u64));
        group.bench_with_input(BenchmarkId::new("drag", frames), &offsets, |b, offsets| {
            b.iter(|| {
                let mut visible = VisibleSet::new();
                let mut churn = 0;
                for offset in offsets {
                    let next = compute_visible_range(*offset, viewport, &spec, 1).to_set();
                    let diff = visible.reconcile(next);
                    churn += diff.to_add.len() + diff.to_remove.len();
                }
                black_box(churn)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compute_visible_range, bench_reconcile_drag);
criterion_main!(benches);

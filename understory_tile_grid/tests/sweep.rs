// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `understory_tile_grid` crate.
//!
//! These sweep an offset across a grid the way a drag would and check that the
//! tracked set follows the computed range exactly, with minimal churn.

use kurbo::{Point, Size, Vec2};
use understory_tile_grid::{GridSpec, OffsetBounds, VisibleSet, compute_visible_range};

fn spec() -> GridSpec {
    GridSpec::new(15, 200.0, 20.0, 100).unwrap()
}

#[test]
fn sweep_keeps_set_equal_to_latest_range() {
    let spec = spec();
    let viewport = Size::new(800.0, 600.0);
    let bounds = OffsetBounds::new(viewport, spec.total_size());
    let mut visible = VisibleSet::new();

    let mut offset = bounds.initial();
    for step in 0..200 {
        let delta = Vec2::new(-37.0, if step < 100 { -11.0 } else { 13.0 });
        offset = bounds.clamp(offset + delta);
        let range = compute_visible_range(offset, viewport, &spec, 1);
        let next = range.to_set();
        let diff = visible.reconcile(next.clone());

        assert_eq!(visible.as_set(), &next);
        for index in &diff.to_add {
            assert!(range.contains(*index));
        }
        for index in &diff.to_remove {
            assert!(!range.contains(*index));
        }
        assert!(visible.reconcile(next).is_empty());
    }
}

#[test]
fn every_visible_pixel_has_a_realized_cell() {
    let spec = spec();
    let viewport = Size::new(800.0, 600.0);
    let bounds = OffsetBounds::new(viewport, spec.total_size());

    for (x, y) in [(0.0, 0.0), (-333.0, -77.0), (-2_480.0, -920.0), (-1_210.0, -440.0)] {
        let offset = bounds.clamp(Vec2::new(x, y));
        let range = compute_visible_range(offset, viewport, &spec, 1);
        let mut py = 0.0;
        while py < viewport.height {
            let mut px = 0.0;
            while px < viewport.width {
                let grid_point = Point::new(px, py) - offset;
                if let Some(index) = spec.index_at(grid_point) {
                    assert!(range.contains(index), "cell {index} at {grid_point:?} missing");
                }
                px += 25.0;
            }
            py += 25.0;
        }
    }
}

#[test]
fn empty_grid_never_realizes_anything() {
    let spec = spec().with_item_count(0);
    let bounds = OffsetBounds::new(Size::new(800.0, 600.0), spec.total_size());
    assert_eq!(bounds.initial().y, 300.0);
    let range = compute_visible_range(bounds.initial(), Size::new(800.0, 600.0), &spec, 1);
    assert!(range.is_empty());
    assert_eq!(range.indices().count(), 0);
}

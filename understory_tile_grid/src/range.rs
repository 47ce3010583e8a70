// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visible cell range computation.

use core::ops::Range;

use hashbrown::HashSet;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Size, Vec2};

use crate::spec::{GridSpec, f64_to_usize, usize_to_f64};

/// Rows and columns of a grid that should be realized for a viewport.
///
/// Both ranges are half-open and already clamped to the grid. A range can
/// still cover slots past `item_count` in the last row; [`VisibleRange::indices`]
/// skips those.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct VisibleRange {
    rows: Range<usize>,
    columns: Range<usize>,
    stride: usize,
    item_count: usize,
}

impl VisibleRange {
    /// An empty range.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Visible rows, `[start, end)`.
    #[must_use]
    pub fn rows(&self) -> Range<usize> {
        self.rows.clone()
    }

    /// Visible columns, `[start, end)`.
    #[must_use]
    pub fn columns(&self) -> Range<usize> {
        self.columns.clone()
    }

    /// Returns `true` if no index is covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices().next().is_none()
    }

    /// Returns `true` if `index` lies in the range.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        if index >= self.item_count || self.stride == 0 {
            return false;
        }
        self.rows.contains(&(index / self.stride)) && self.columns.contains(&(index % self.stride))
    }

    /// Iterates the covered indices in row-major order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.clone().flat_map(move |row| {
            self.columns
                .clone()
                .map(move |column| row * self.stride + column)
                .filter(move |&index| index < self.item_count)
        })
    }

    /// Collects the covered indices into a set, ready for [`crate::VisibleSet::reconcile`].
    #[must_use]
    pub fn to_set(&self) -> HashSet<usize> {
        self.indices().collect()
    }
}

/// Computes which cells of `spec` must exist for a grid drawn at `offset`
/// inside a viewport of `viewport` size.
///
/// The first visible column is `floor(-offset.x / pitch)` and the visible
/// column count is `ceil(viewport.width / pitch) + 1`, so a partially shown
/// cell at either edge is always covered. The range is then widened by
/// `buffer` cells on both sides (at least one, so fast motion never exposes
/// an unrealized cell before the next reconciliation) and clamped to the grid.
/// Rows work the same way.
///
/// Non-finite offsets, empty viewports and empty grids yield an empty range.
#[must_use]
pub fn compute_visible_range(
    offset: Vec2,
    viewport: Size,
    spec: &GridSpec,
    buffer: usize,
) -> VisibleRange {
    if !offset.is_finite()
        || !viewport.is_finite()
        || viewport.width <= 0.0
        || viewport.height <= 0.0
        || spec.is_empty()
    {
        return VisibleRange::empty();
    }

    let pitch = spec.pitch();
    let buffer = usize_to_f64(buffer.max(1));
    let columns = axis_range(-offset.x, viewport.width, pitch, buffer, spec.columns());
    let rows = axis_range(-offset.y, viewport.height, pitch, buffer, spec.rows());
    if columns.is_empty() || rows.is_empty() {
        return VisibleRange::empty();
    }

    VisibleRange {
        rows,
        columns,
        stride: spec.columns(),
        item_count: spec.item_count(),
    }
}

fn axis_range(scroll: f64, extent: f64, pitch: f64, buffer: f64, count: usize) -> Range<usize> {
    let first = (scroll / pitch).floor();
    let span = (extent / pitch).ceil() + 1.0;
    let limit = usize_to_f64(count);
    let start = (first - buffer).clamp(0.0, limit);
    let end = (first + span + buffer).clamp(0.0, limit);
    if end <= start {
        return 0..0;
    }
    f64_to_usize(start)..f64_to_usize(end)
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use kurbo::{Rect, Size, Vec2};

    use super::compute_visible_range;
    use crate::spec::GridSpec;

    fn spec() -> GridSpec {
        GridSpec::new(15, 200.0, 20.0, 100).unwrap()
    }

    #[test]
    fn origin_scenario_matches_formula() {
        let range = compute_visible_range(Vec2::ZERO, Size::new(800.0, 600.0), &spec(), 1);
        // ceil(800 / 220) + 1 visible columns plus one buffer column.
        assert_eq!(range.columns(), 0..6);
        // ceil(600 / 220) + 1 visible rows plus one buffer row.
        assert_eq!(range.rows(), 0..5);

        let indices: Vec<usize> = range.indices().collect();
        assert_eq!(indices.len(), 30);
        assert_eq!(&indices[..6], &[0, 1, 2, 3, 4, 5]);
        assert_eq!(&indices[24..], &[60, 61, 62, 63, 64, 65]);
    }

    #[test]
    fn scrolled_range_buffers_both_sides() {
        // Scrolled by 5.5 cells to the right and 2 rows down.
        let offset = Vec2::new(-5.5 * 220.0, -2.0 * 220.0);
        let range = compute_visible_range(offset, Size::new(800.0, 600.0), &spec(), 1);
        assert_eq!(range.columns(), 4..11);
        assert_eq!(range.rows(), 1..7);
    }

    #[test]
    fn end_is_clamped_to_grid() {
        let offset = Vec2::new(-3000.0, -1400.0);
        let range = compute_visible_range(offset, Size::new(800.0, 600.0), &spec(), 1);
        assert_eq!(range.columns().end, 15);
        assert_eq!(range.rows().end, 7);
        // Trailing empty slots of the last row are skipped.
        assert!(range.indices().all(|i| i < 100));
        assert!(!range.contains(104));
    }

    #[test]
    fn positive_offset_starts_at_zero() {
        let offset = Vec2::new(240.0, 0.0);
        let range = compute_visible_range(offset, Size::new(800.0, 600.0), &spec(), 1);
        assert_eq!(range.columns().start, 0);
        assert!(range.contains(0));
    }

    #[test]
    fn degenerate_inputs_are_empty() {
        let spec = spec();
        let size = Size::new(800.0, 600.0);
        assert!(compute_visible_range(Vec2::new(f64::NAN, 0.0), size, &spec, 1).is_empty());
        assert!(compute_visible_range(Vec2::ZERO, Size::ZERO, &spec, 1).is_empty());
        assert!(compute_visible_range(Vec2::ZERO, size, &spec.with_item_count(0), 1).is_empty());
        // Scrolled entirely past the content.
        assert!(compute_visible_range(Vec2::new(-1.0e6, 0.0), size, &spec, 1).is_empty());
    }

    #[test]
    fn zero_buffer_is_raised_to_one() {
        let size = Size::new(800.0, 600.0);
        let offset = Vec2::new(-2200.0, -440.0);
        assert_eq!(
            compute_visible_range(offset, size, &spec(), 0),
            compute_visible_range(offset, size, &spec(), 1)
        );
    }

    #[test]
    fn covers_every_cell_in_buffered_viewport() {
        let spec = spec();
        let pitch = spec.pitch();
        let viewports = [Size::new(800.0, 600.0), Size::new(333.0, 917.0), Size::new(1.0, 1.0)];
        let mut offsets = Vec::new();
        for step in 0..40 {
            let t = f64::from(step);
            offsets.push(Vec2::new(-t * 83.7, -t * 41.3));
            offsets.push(Vec2::new(t * 13.0 - 150.0, -t * 97.1));
        }

        for viewport in viewports {
            for &offset in &offsets {
                let range = compute_visible_range(offset, viewport, &spec, 1);
                let seen = Rect::from_origin_size((-offset).to_point(), viewport);
                let buffered = seen.inflate(pitch, pitch);
                let outer = seen.inflate(2.0 * pitch, 2.0 * pitch);
                for index in 0..spec.item_count() {
                    let cell = spec.cell_rect(index).unwrap();
                    let hit = cell.intersect(buffered);
                    if hit.width() > 0.0 && hit.height() > 0.0 {
                        assert!(
                            range.contains(index),
                            "cell {index} intersects buffered viewport at {offset:?}"
                        );
                    }
                    if range.contains(index) {
                        let hit = cell.intersect(outer);
                        assert!(
                            hit.width() > 0.0 && hit.height() > 0.0,
                            "cell {index} realized far outside viewport at {offset:?}"
                        );
                    }
                }
            }
        }
    }
}

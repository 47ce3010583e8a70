// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use understory_momentum::MotionConfig;
use understory_tile_grid::{GridSpec, GridSpecError};

/// Gallery layout and timing.
///
/// Lengths are in CSS pixels and durations in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GalleryConfig {
    /// Number of grid columns.
    pub columns: usize,
    /// Edge length of a tile.
    pub cell_size: f64,
    /// Gap between tiles.
    pub gap: f64,
    /// Extra cells realized beyond each viewport edge (at least one).
    pub buffer_cells: usize,
    /// Duration of the tile exit animation before the node is removed.
    pub exit_animation_ms: f64,
    /// Interval between banner refreshes.
    pub banner_refresh_ms: f64,
    /// Viewports narrower than this are [`crate::ViewportClass::Mobile`].
    pub mobile_breakpoint: f64,
    /// How long the "copied" confirmation stays up in the lightbox.
    pub copy_feedback_ms: f64,
    /// Drag and momentum tuning.
    pub motion: MotionConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            columns: 15,
            cell_size: 200.0,
            gap: 20.0,
            buffer_cells: 1,
            exit_animation_ms: 300.0,
            banner_refresh_ms: 30_000.0,
            mobile_breakpoint: 768.0,
            copy_feedback_ms: 2_000.0,
            motion: MotionConfig::default().with_cell_size(200.0),
        }
    }
}

impl GalleryConfig {
    /// Returns a copy with a different cell size, keeping the reconciliation
    /// distance at half a cell.
    #[must_use]
    pub fn with_cell_size(self, cell_size: f64) -> Self {
        Self {
            cell_size,
            motion: self.motion.with_cell_size(cell_size),
            ..self
        }
    }

    /// Grid geometry for `item_count` items.
    pub fn grid_spec(&self, item_count: usize) -> Result<GridSpec, GridSpecError> {
        GridSpec::new(self.columns, self.cell_size, self.gap, item_count)
    }
}

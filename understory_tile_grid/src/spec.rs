// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid geometry: column count, cell pitch and derived sizes.

use core::fmt;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect, Size};

/// Error returned when a [`GridSpec`] is constructed from invalid parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GridSpecError {
    /// The column count was zero.
    ZeroColumns,
    /// The cell size was zero, negative, or not finite.
    InvalidCellSize(f64),
    /// The gap was negative or not finite.
    InvalidGap(f64),
}

impl fmt::Display for GridSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroColumns => write!(f, "grid must have at least one column"),
            Self::InvalidCellSize(size) => {
                write!(f, "cell size must be finite and positive, got {size}")
            }
            Self::InvalidGap(gap) => write!(f, "gap must be finite and non-negative, got {gap}"),
        }
    }
}

impl core::error::Error for GridSpecError {}

/// Geometry of a row-major grid of equally sized cells.
///
/// Cell `index` sits at row `index / columns` and column `index % columns`.
/// Cells are `cell_size` square and separated by `gap` on both axes, so the
/// distance between the origins of two neighbouring cells (the *pitch*) is
/// `cell_size + gap`. There is no gap before the first or after the last cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpec {
    columns: usize,
    cell_size: f64,
    gap: f64,
    item_count: usize,
}

impl GridSpec {
    /// Creates a grid spec, validating its parameters.
    pub fn new(
        columns: usize,
        cell_size: f64,
        gap: f64,
        item_count: usize,
    ) -> Result<Self, GridSpecError> {
        if columns == 0 {
            return Err(GridSpecError::ZeroColumns);
        }
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridSpecError::InvalidCellSize(cell_size));
        }
        if !gap.is_finite() || gap < 0.0 {
            return Err(GridSpecError::InvalidGap(gap));
        }
        Ok(Self {
            columns,
            cell_size,
            gap,
            item_count,
        })
    }

    /// Returns a copy of this spec holding `item_count` items.
    #[must_use]
    pub fn with_item_count(self, item_count: usize) -> Self {
        Self { item_count, ..self }
    }

    /// Number of columns.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Edge length of a cell.
    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Spacing between adjacent cells.
    #[must_use]
    pub fn gap(&self) -> f64 {
        self.gap
    }

    /// Number of items laid out in the grid.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Number of rows, `ceil(item_count / columns)`.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.item_count.div_ceil(self.columns)
    }

    /// Distance between the origins of two neighbouring cells.
    #[must_use]
    pub fn pitch(&self) -> f64 {
        self.cell_size + self.gap
    }

    /// Returns `true` if the grid has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }

    /// Total size of the laid-out grid, without trailing gaps.
    ///
    /// The height is zero for an empty grid.
    #[must_use]
    pub fn total_size(&self) -> Size {
        Size::new(self.span(self.columns), self.span(self.rows()))
    }

    /// Returns `(row, column)` for `index`, or `None` when out of range.
    #[must_use]
    pub fn cell_of(&self, index: usize) -> Option<(usize, usize)> {
        (index < self.item_count).then(|| (index / self.columns, index % self.columns))
    }

    /// Returns the index at `(row, column)`, or `None` when no item lives there.
    #[must_use]
    pub fn index_of(&self, row: usize, column: usize) -> Option<usize> {
        if column >= self.columns {
            return None;
        }
        let index = row.checked_mul(self.columns)?.checked_add(column)?;
        (index < self.item_count).then_some(index)
    }

    /// Top-left corner of the cell for `index` in grid space.
    #[must_use]
    pub fn cell_origin(&self, index: usize) -> Option<Point> {
        let (row, column) = self.cell_of(index)?;
        let pitch = self.pitch();
        Some(Point::new(
            usize_to_f64(column) * pitch,
            usize_to_f64(row) * pitch,
        ))
    }

    /// Rectangle covered by the cell for `index` in grid space.
    #[must_use]
    pub fn cell_rect(&self, index: usize) -> Option<Rect> {
        let origin = self.cell_origin(index)?;
        Some(Rect::from_origin_size(
            origin,
            Size::new(self.cell_size, self.cell_size),
        ))
    }

    /// Hit-tests a grid-space point against the cells.
    ///
    /// Points in the gaps between cells, outside the grid, or over an empty
    /// trailing slot in the last row return `None`.
    #[must_use]
    pub fn index_at(&self, point: Point) -> Option<usize> {
        if !point.x.is_finite() || !point.y.is_finite() || point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let pitch = self.pitch();
        let column = (point.x / pitch).floor();
        let row = (point.y / pitch).floor();
        if point.x - column * pitch >= self.cell_size || point.y - row * pitch >= self.cell_size {
            return None;
        }
        self.index_of(f64_to_usize(row), f64_to_usize(column))
    }

    fn span(&self, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        usize_to_f64(count) * self.cell_size + usize_to_f64(count - 1) * self.gap
    }
}

pub(crate) fn usize_to_f64(value: usize) -> f64 {
    value as f64
}

/// Converts a non-negative, already floored value to `usize`, saturating.
pub(crate) fn f64_to_usize(value: f64) -> usize {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "Callers pass floored, non-negative values; `as` saturates the rest"
    )]
    {
        value as usize
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Size};

    use super::{GridSpec, GridSpecError};

    fn spec() -> GridSpec {
        GridSpec::new(15, 200.0, 20.0, 100).unwrap()
    }

    #[test]
    fn derived_dimensions() {
        let spec = spec();
        assert_eq!(spec.rows(), 7);
        assert!((spec.pitch() - 220.0).abs() < f64::EPSILON);
        // 15 * 200 + 14 * 20 and 7 * 200 + 6 * 20.
        assert_eq!(spec.total_size(), Size::new(3280.0, 1520.0));
    }

    #[test]
    fn empty_grid_has_no_rows() {
        let spec = spec().with_item_count(0);
        assert_eq!(spec.rows(), 0);
        assert!(spec.is_empty());
        assert!(spec.total_size().height.abs() < f64::EPSILON);
        assert_eq!(spec.cell_of(0), None);
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert_eq!(
            GridSpec::new(0, 10.0, 0.0, 1),
            Err(GridSpecError::ZeroColumns)
        );
        assert!(matches!(
            GridSpec::new(3, 0.0, 0.0, 1),
            Err(GridSpecError::InvalidCellSize(_))
        ));
        assert!(matches!(
            GridSpec::new(3, f64::NAN, 0.0, 1),
            Err(GridSpecError::InvalidCellSize(_))
        ));
        assert!(matches!(
            GridSpec::new(3, 10.0, -1.0, 1),
            Err(GridSpecError::InvalidGap(_))
        ));
    }

    #[test]
    fn index_and_cell_are_row_major() {
        let spec = spec();
        assert_eq!(spec.cell_of(16), Some((1, 1)));
        assert_eq!(spec.index_of(1, 1), Some(16));
        // Row 6 only holds indices 90..100.
        assert_eq!(spec.index_of(6, 9), Some(99));
        assert_eq!(spec.index_of(6, 10), None);
        assert_eq!(spec.index_of(0, 15), None);
        assert_eq!(spec.cell_origin(16), Some(Point::new(220.0, 220.0)));
    }

    #[test]
    fn index_at_skips_gaps() {
        let spec = spec();
        assert_eq!(spec.index_at(Point::new(10.0, 10.0)), Some(0));
        assert_eq!(spec.index_at(Point::new(230.0, 5.0)), Some(1));
        // Inside the gap between column 0 and 1.
        assert_eq!(spec.index_at(Point::new(210.0, 5.0)), None);
        assert_eq!(spec.index_at(Point::new(-1.0, 5.0)), None);
        // Past the last item of the final row.
        assert_eq!(spec.index_at(Point::new(14.0 * 220.0 + 1.0, 6.0 * 220.0 + 1.0)), None);
    }
}

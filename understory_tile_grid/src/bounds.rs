// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Valid range of the grid offset for a given viewport.

use kurbo::{Size, Vec2};

/// Closed interval `[min, max]` for one axis of the grid offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisBounds {
    /// Smallest allowed offset (content scrolled to its far edge).
    pub min: f64,
    /// Largest allowed offset (content aligned to its near edge).
    pub max: f64,
}

impl AxisBounds {
    /// Bounds for content of `content` length shown in a viewport of `viewport` length.
    ///
    /// Content larger than the viewport may scroll between `viewport - content`
    /// and `0`, so it always covers the viewport. Content that fits is pinned
    /// to the centering position `(viewport - content) / 2`.
    #[must_use]
    pub fn new(viewport: f64, content: f64) -> Self {
        let viewport = sanitize(viewport);
        let content = sanitize(content);
        if content <= viewport {
            let center = (viewport - content) / 2.0;
            Self {
                min: center,
                max: center,
            }
        } else {
            Self {
                min: viewport - content,
                max: 0.0,
            }
        }
    }

    /// Clamps `value` into the interval.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.max;
        }
        value.clamp(self.min, self.max)
    }

    /// Returns `true` if `value` lies in the interval.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Returns `true` if the content cannot scroll on this axis.
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.min >= self.max
    }
}

/// Valid range for a 2D grid offset.
///
/// The same bounds are used for dragging, momentum, initial placement and
/// resizing, so every motion source agrees on where the grid may go.
///
/// ```
/// use kurbo::{Size, Vec2};
/// use understory_tile_grid::OffsetBounds;
///
/// let bounds = OffsetBounds::new(Size::new(800.0, 600.0), Size::new(3280.0, 400.0));
/// assert_eq!(bounds.clamp(Vec2::new(100.0, -50.0)), Vec2::new(0.0, 100.0));
/// assert_eq!(bounds.clamp(Vec2::new(-5000.0, 0.0)).x, -2480.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OffsetBounds {
    /// Horizontal bounds.
    pub x: AxisBounds,
    /// Vertical bounds.
    pub y: AxisBounds,
}

impl OffsetBounds {
    /// Bounds for `content` shown inside `viewport`.
    #[must_use]
    pub fn new(viewport: Size, content: Size) -> Self {
        Self {
            x: AxisBounds::new(viewport.width, content.width),
            y: AxisBounds::new(viewport.height, content.height),
        }
    }

    /// Clamps `offset` into the bounds.
    #[must_use]
    pub fn clamp(&self, offset: Vec2) -> Vec2 {
        Vec2::new(self.x.clamp(offset.x), self.y.clamp(offset.y))
    }

    /// Returns `true` if `offset` lies inside the bounds.
    #[must_use]
    pub fn contains(&self, offset: Vec2) -> bool {
        self.x.contains(offset.x) && self.y.contains(offset.y)
    }

    /// Resting offset for a freshly mounted grid.
    ///
    /// Axes where the content fits are centered; other axes start at the
    /// near edge.
    #[must_use]
    pub fn initial(&self) -> Vec2 {
        Vec2::new(self.x.max, self.y.max)
    }
}

fn sanitize(length: f64) -> f64 {
    if length.is_finite() { length.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use kurbo::{Size, Vec2};

    use super::{AxisBounds, OffsetBounds};

    #[test]
    fn larger_content_scrolls_to_far_edge() {
        let axis = AxisBounds::new(800.0, 3280.0);
        assert_eq!(axis.min, -2480.0);
        assert_eq!(axis.max, 0.0);
        assert!(!axis.is_pinned());
        assert_eq!(axis.clamp(50.0), 0.0);
        assert_eq!(axis.clamp(-3000.0), -2480.0);
        assert_eq!(axis.clamp(-100.0), -100.0);
    }

    #[test]
    fn fitting_content_is_centered() {
        let axis = AxisBounds::new(800.0, 400.0);
        assert!(axis.is_pinned());
        assert_eq!(axis.clamp(-10_000.0), 200.0);
        assert_eq!(axis.clamp(10_000.0), 200.0);
    }

    #[test]
    fn nan_and_degenerate_lengths_are_safe() {
        let axis = AxisBounds::new(f64::NAN, 100.0);
        assert_eq!(axis.min, -100.0);
        assert_eq!(axis.clamp(f64::NAN), 0.0);

        let empty = OffsetBounds::new(Size::new(800.0, 600.0), Size::ZERO);
        assert_eq!(empty.initial(), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn initial_places_near_edge_or_center() {
        let bounds = OffsetBounds::new(Size::new(800.0, 600.0), Size::new(3280.0, 400.0));
        assert_eq!(bounds.initial(), Vec2::new(0.0, 100.0));
        assert!(bounds.contains(bounds.initial()));
    }
}

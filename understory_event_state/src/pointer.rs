// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timestamped pointer positions.

use kurbo::{Point, Vec2};

/// A pointer position and the time it was observed.
///
/// Positions are in viewport space (typically CSS pixels); timestamps are in
/// milliseconds from an arbitrary, monotonic origin such as
/// `performance.now()`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    /// Pointer position.
    pub position: Point,
    /// Observation time in milliseconds.
    pub time_ms: f64,
}

impl PointerSample {
    /// Creates a sample.
    #[must_use]
    pub const fn new(position: Point, time_ms: f64) -> Self {
        Self { position, time_ms }
    }

    /// Velocity in pixels per millisecond travelling from `earlier` to `self`.
    ///
    /// Returns `None` when no time elapsed (or time went backwards), which
    /// happens with coalesced or synthetic events.
    #[must_use]
    pub fn velocity_since(&self, earlier: &Self) -> Option<Vec2> {
        let elapsed = self.time_ms - earlier.time_ms;
        if elapsed > 0.0 && elapsed.is_finite() {
            Some((self.position - earlier.position) / elapsed)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Vec2};

    use super::PointerSample;

    #[test]
    fn velocity_is_pixels_per_millisecond() {
        let a = PointerSample::new(Point::new(0.0, 0.0), 100.0);
        let b = PointerSample::new(Point::new(20.0, -10.0), 110.0);
        assert_eq!(b.velocity_since(&a), Some(Vec2::new(2.0, -1.0)));
    }

    #[test]
    fn zero_or_negative_elapsed_has_no_velocity() {
        let a = PointerSample::new(Point::new(0.0, 0.0), 100.0);
        let b = PointerSample::new(Point::new(20.0, 0.0), 100.0);
        assert_eq!(b.velocity_since(&a), None);
        assert_eq!(a.velocity_since(&b), None);
    }
}

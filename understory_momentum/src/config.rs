// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Tuning constants for [`crate::MotionController`].
///
/// Velocities are in pixels per millisecond, distances in pixels and
/// durations in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionConfig {
    /// Factor applied to the velocity on every momentum frame, in `(0, 1)`.
    pub friction: f64,
    /// Fraction of the velocity kept (and reversed) when momentum hits a bound.
    pub bounce: f64,
    /// Momentum stops once both velocity components are at or below this.
    pub min_velocity: f64,
    /// A release faster than this on either axis starts momentum.
    pub release_threshold: f64,
    /// Frame duration assumed when integrating momentum.
    pub frame_ms: f64,
    /// Pointer travel beyond which a press becomes a drag instead of a tap.
    pub tap_slop: f64,
    /// Offset travel on either axis since the last reconciliation that
    /// triggers a new one. Typically half a cell.
    pub reconcile_distance: f64,
    /// Optional time-based throttle: when set, a reconciliation also runs once
    /// this much time passed since the previous one and the offset moved at all.
    pub reconcile_interval_ms: Option<f64>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            friction: 0.95,
            bounce: 0.5,
            min_velocity: 0.01,
            release_threshold: 0.1,
            frame_ms: 16.0,
            tap_slop: 5.0,
            reconcile_distance: 100.0,
            reconcile_interval_ms: None,
        }
    }
}

impl MotionConfig {
    /// Returns a copy that reconciles after half a cell of travel.
    #[must_use]
    pub fn with_cell_size(self, cell_size: f64) -> Self {
        Self {
            reconcile_distance: cell_size / 2.0,
            ..self
        }
    }

    /// Returns a copy with a time-based reconciliation throttle.
    #[must_use]
    pub fn with_reconcile_interval(self, interval_ms: Option<f64>) -> Self {
        Self {
            reconcile_interval_ms: interval_ms,
            ..self
        }
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag state helper: movement deltas, velocity and tap-versus-drag classification.
//!
//! ## Usage
//!
//! 1) Start a gesture by calling [`DragState::start`] with the press sample.
//! 2) On each move event, call [`DragState::update`] to get the movement since the
//!    last sample, the total offset from the start, and the instantaneous velocity.
//! 3) Query [`DragState::exceeded_slop`] to decide whether a release should count
//!    as a tap.
//! 4) End the gesture with [`DragState::end`], which returns the release summary.
//!
//! ## Minimal example
//!
//! ```
//! use kurbo::Point;
//! use understory_event_state::drag::DragState;
//! use understory_event_state::pointer::PointerSample;
//!
//! let mut drag = DragState::default();
//!
//! // Press at (10, 20) and release without moving.
//! drag.start(PointerSample::new(Point::new(10.0, 20.0), 0.0));
//! assert!(drag.is_dragging());
//!
//! let release = drag.end().unwrap();
//! assert!(release.is_tap());
//! assert!(!drag.is_dragging());
//! ```

use kurbo::Vec2;

use crate::pointer::PointerSample;

/// Movement reported by [`DragState::update`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragUpdate {
    /// Movement since the previous sample.
    pub delta: Vec2,
    /// Movement since the press.
    pub total: Vec2,
    /// Most recent velocity estimate in pixels per millisecond.
    pub velocity: Vec2,
}

/// Summary of a finished gesture, returned by [`DragState::end`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragRelease {
    /// Velocity at release in pixels per millisecond.
    pub velocity: Vec2,
    /// Whether the pointer ever moved beyond the slop distance.
    pub exceeded_slop: bool,
}

impl DragRelease {
    /// A release that never moved past the slop counts as a tap.
    #[must_use]
    pub fn is_tap(&self) -> bool {
        !self.exceeded_slop
    }
}

/// Tracks a press-move-release gesture.
#[derive(Debug, Clone, Default, Copy)]
pub struct DragState {
    /// Sample recorded at the press.
    pub start: Option<PointerSample>,
    /// Last recorded sample during the gesture.
    pub last: Option<PointerSample>,
    velocity: Vec2,
    exceeded_slop: bool,
}

impl DragState {
    /// Start tracking a new gesture from `sample`, discarding any previous one.
    pub fn start(&mut self, sample: PointerSample) {
        self.start = Some(sample);
        self.last = Some(sample);
        self.velocity = Vec2::ZERO;
        self.exceeded_slop = false;
    }

    /// Record a new sample.
    ///
    /// The velocity estimate is refreshed from the previous sample when time
    /// has elapsed and kept otherwise. Once the total movement exceeds `slop`
    /// pixels the gesture is classified as a drag for the rest of its life.
    ///
    /// Returns `None` when no gesture is active.
    pub fn update(&mut self, sample: PointerSample, slop: f64) -> Option<DragUpdate> {
        let start = self.start?;
        let last = self.last.unwrap_or(start);

        if let Some(velocity) = sample.velocity_since(&last) {
            self.velocity = velocity;
        }
        self.last = Some(sample);

        let total = sample.position - start.position;
        if total.hypot() > slop {
            self.exceeded_slop = true;
        }

        Some(DragUpdate {
            delta: sample.position - last.position,
            total,
            velocity: self.velocity,
        })
    }

    /// Total offset of `sample` from the press position.
    #[must_use]
    pub fn total_offset(&self, sample: &PointerSample) -> Option<Vec2> {
        self.start.map(|start| sample.position - start.position)
    }

    /// Most recent velocity estimate in pixels per millisecond.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Returns `true` once the gesture moved past its slop distance.
    #[must_use]
    pub fn exceeded_slop(&self) -> bool {
        self.exceeded_slop
    }

    /// End the current gesture and reset state.
    ///
    /// Returns `None` if no gesture was active.
    pub fn end(&mut self) -> Option<DragRelease> {
        self.start?;
        let release = DragRelease {
            velocity: self.velocity,
            exceeded_slop: self.exceeded_slop,
        };
        *self = Self::default();
        Some(release)
    }

    /// Returns `true` while a gesture is active.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.start.is_some()
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Vec2};

    use super::*;

    const SLOP: f64 = 5.0;

    fn sample(x: f64, y: f64, time_ms: f64) -> PointerSample {
        PointerSample::new(Point::new(x, y), time_ms)
    }

    #[test]
    fn new_drag_state_is_not_dragging() {
        let drag = DragState::default();
        assert!(!drag.is_dragging());
        assert_eq!(drag.velocity(), Vec2::ZERO);
    }

    #[test]
    fn update_returns_delta_total_and_velocity() {
        let mut drag = DragState::default();
        drag.start(sample(10.0, 20.0, 0.0));

        let update = drag.update(sample(15.0, 25.0, 5.0), SLOP).unwrap();
        assert_eq!(update.delta, Vec2::new(5.0, 5.0));
        assert_eq!(update.total, Vec2::new(5.0, 5.0));
        assert_eq!(update.velocity, Vec2::new(1.0, 1.0));

        let update = drag.update(sample(25.0, 25.0, 10.0), SLOP).unwrap();
        assert_eq!(update.delta, Vec2::new(10.0, 0.0));
        assert_eq!(update.total, Vec2::new(15.0, 5.0));
        assert_eq!(update.velocity, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn update_returns_none_when_not_dragging() {
        let mut drag = DragState::default();
        assert_eq!(drag.update(sample(15.0, 25.0, 1.0), SLOP), None);
        assert!(drag.last.is_none());
    }

    #[test]
    fn zero_elapsed_time_keeps_previous_velocity() {
        let mut drag = DragState::default();
        drag.start(sample(0.0, 0.0, 0.0));
        drag.update(sample(4.0, 0.0, 2.0), SLOP);
        let update = drag.update(sample(8.0, 0.0, 2.0), SLOP).unwrap();
        assert_eq!(update.velocity, Vec2::new(2.0, 0.0));
        assert_eq!(update.delta, Vec2::new(4.0, 0.0));
    }

    #[test]
    fn stationary_press_is_a_tap() {
        let mut drag = DragState::default();
        drag.start(sample(100.0, 100.0, 0.0));
        drag.update(sample(100.0, 100.0, 16.0), SLOP);
        assert!(!drag.exceeded_slop());

        let release = drag.end().unwrap();
        assert!(release.is_tap());
        assert_eq!(release.velocity, Vec2::ZERO);
    }

    #[test]
    fn small_jitter_stays_a_tap() {
        let mut drag = DragState::default();
        drag.start(sample(0.0, 0.0, 0.0));
        drag.update(sample(3.0, 4.0, 10.0), SLOP);
        assert!(!drag.exceeded_slop());
    }

    #[test]
    fn slop_classification_is_sticky() {
        let mut drag = DragState::default();
        drag.start(sample(0.0, 0.0, 0.0));
        drag.update(sample(6.0, 0.0, 10.0), SLOP);
        assert!(drag.exceeded_slop());

        // Returning to the press position does not turn it back into a tap.
        drag.update(sample(0.0, 0.0, 20.0), SLOP);
        assert!(!drag.end().unwrap().is_tap());
    }

    #[test]
    fn end_resets_state() {
        let mut drag = DragState::default();
        drag.start(sample(10.0, 20.0, 0.0));
        drag.update(sample(30.0, 20.0, 10.0), SLOP);

        assert!(drag.end().is_some());
        assert!(drag.start.is_none());
        assert!(drag.last.is_none());
        assert!(!drag.exceeded_slop());
        assert_eq!(drag.end(), None);
    }

    #[test]
    fn start_overwrites_previous_drag() {
        let mut drag = DragState::default();
        drag.start(sample(0.0, 0.0, 0.0));
        drag.update(sample(50.0, 50.0, 10.0), SLOP);

        drag.start(sample(50.0, 60.0, 100.0));
        assert!(!drag.exceeded_slop());
        assert_eq!(drag.velocity(), Vec2::ZERO);
        assert_eq!(
            drag.total_offset(&sample(55.0, 65.0, 110.0)),
            Some(Vec2::new(5.0, 5.0))
        );
    }
}

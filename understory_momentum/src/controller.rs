// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Vec2;
use understory_event_state::drag::DragState;
use understory_event_state::pointer::PointerSample;
use understory_tile_grid::{AxisBounds, OffsetBounds};

use crate::config::MotionConfig;

bitflags::bitflags! {
    /// Work the host should perform after feeding an input to [`MotionController`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct MotionEffects: u8 {
        /// The offset changed; update the grid transform.
        const REPOSITION    = 0b0000_0001;
        /// Recompute the realized tile set for the current offset.
        const RECONCILE     = 0b0000_0010;
        /// Schedule an animation frame and call [`MotionController::frame`] from it.
        const REQUEST_FRAME = 0b0000_0100;
        /// Cancel the outstanding animation frame, if any.
        const CANCEL_FRAME  = 0b0000_1000;
        /// The release was a tap at the release position.
        const TAP           = 0b0001_0000;
    }
}

/// Coarse phase of a [`MotionController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionPhase {
    /// Nothing moves.
    Idle,
    /// The offset follows the pointer.
    Dragging,
    /// The offset glides after a release.
    Momentum,
}

/// Full state of a [`MotionController`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MotionState {
    /// Nothing moves.
    Idle,
    /// A pointer is pressed.
    Dragging {
        /// Pointer at the press.
        start: PointerSample,
        /// Grid offset at the press.
        start_offset: Vec2,
        /// Most recent pointer sample.
        last: PointerSample,
    },
    /// The offset glides with `velocity` (pixels per millisecond).
    Momentum {
        /// Current velocity.
        velocity: Vec2,
    },
}

/// Offset state machine for drag-to-pan with momentum.
///
/// Transitions:
///
/// - `Idle | Momentum --pointer_down--> Dragging`; a pending frame is cancelled.
/// - `Dragging --pointer_move--> Dragging`; the offset follows the pointer.
/// - `Dragging --pointer_up/pointer_leave--> Idle` for slow releases and taps, else `Momentum`.
/// - `Momentum --frame--> Momentum`, until the velocity decays, then `Idle`.
///
/// The offset is clamped to [`OffsetBounds`] after every change, so it never
/// leaves them regardless of input velocity.
#[derive(Clone, Debug)]
pub struct MotionController {
    config: MotionConfig,
    bounds: OffsetBounds,
    offset: Vec2,
    drag: DragState,
    start_offset: Vec2,
    velocity: Vec2,
    momentum: bool,
    /// Press interrupted momentum; its release is not a tap.
    caught: bool,
    drag_gesture: bool,
    last_reconcile_offset: Vec2,
    last_reconcile_ms: f64,
    last_time_ms: f64,
}

impl MotionController {
    /// Creates an idle controller resting at [`OffsetBounds::initial`].
    #[must_use]
    pub fn new(config: MotionConfig, bounds: OffsetBounds) -> Self {
        let offset = bounds.initial();
        Self {
            config,
            bounds,
            offset,
            drag: DragState::default(),
            start_offset: offset,
            velocity: Vec2::ZERO,
            momentum: false,
            caught: false,
            drag_gesture: false,
            last_reconcile_offset: offset,
            last_reconcile_ms: f64::NEG_INFINITY,
            last_time_ms: 0.0,
        }
    }

    /// Tuning constants.
    #[must_use]
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Current bounds.
    #[must_use]
    pub fn bounds(&self) -> OffsetBounds {
        self.bounds
    }

    /// Current grid offset.
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Current velocity in pixels per millisecond.
    ///
    /// While dragging this is the latest pointer velocity estimate.
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        if self.drag.is_dragging() {
            self.drag.velocity()
        } else {
            self.velocity
        }
    }

    /// Coarse phase.
    #[must_use]
    pub fn phase(&self) -> MotionPhase {
        if self.drag.is_dragging() {
            MotionPhase::Dragging
        } else if self.momentum {
            MotionPhase::Momentum
        } else {
            MotionPhase::Idle
        }
    }

    /// Full state snapshot.
    #[must_use]
    pub fn state(&self) -> MotionState {
        match (self.drag.start, self.drag.last) {
            (Some(start), Some(last)) => MotionState::Dragging {
                start,
                start_offset: self.start_offset,
                last,
            },
            _ if self.momentum => MotionState::Momentum {
                velocity: self.velocity,
            },
            _ => MotionState::Idle,
        }
    }

    /// Returns `true` once the current (or most recent) gesture moved past the
    /// tap slop. Click handlers consult this to ignore the click that ends a
    /// drag; it is cleared by the next press.
    #[must_use]
    pub fn is_drag_gesture(&self) -> bool {
        self.drag_gesture
    }

    /// Replaces the bounds (after a resize or grid reload) and re-clamps the offset.
    pub fn set_bounds(&mut self, bounds: OffsetBounds) -> MotionEffects {
        self.bounds = bounds;
        self.apply_offset(self.offset)
    }

    /// Moves the grid to `offset`, clamped, and stops any momentum.
    pub fn set_offset(&mut self, offset: Vec2) -> MotionEffects {
        let mut effects = self.stop();
        effects |= self.apply_offset(offset);
        effects
    }

    /// Stops momentum immediately, leaving the offset where it is.
    pub fn stop(&mut self) -> MotionEffects {
        if !self.momentum {
            return MotionEffects::empty();
        }
        self.momentum = false;
        self.velocity = Vec2::ZERO;
        MotionEffects::CANCEL_FRAME
    }

    /// Records that the host reconciled tiles for the current offset at `now_ms`.
    ///
    /// Effects returned by this controller already account for the
    /// reconciliations they request; call this for host-initiated ones.
    pub fn mark_reconciled(&mut self, now_ms: f64) {
        self.last_reconcile_offset = self.offset;
        self.last_reconcile_ms = now_ms;
    }

    /// Pointer pressed: start dragging from the current offset.
    pub fn pointer_down(&mut self, sample: PointerSample) -> MotionEffects {
        self.caught = self.momentum;
        let effects = self.stop();
        self.drag.start(sample);
        self.start_offset = self.offset;
        self.velocity = Vec2::ZERO;
        self.drag_gesture = false;
        self.last_time_ms = sample.time_ms;
        effects
    }

    /// Pointer moved while pressed: follow it.
    ///
    /// `REPOSITION` is returned for every move that changes the offset;
    /// `RECONCILE` only after enough travel since the last reconciliation.
    pub fn pointer_move(&mut self, sample: PointerSample) -> MotionEffects {
        let Some(update) = self.drag.update(sample, self.config.tap_slop) else {
            return MotionEffects::empty();
        };
        if self.drag.exceeded_slop() {
            self.drag_gesture = true;
        }
        self.last_time_ms = sample.time_ms;

        let mut effects = self.apply_offset(self.start_offset + update.total);
        if self.should_reconcile(sample.time_ms) {
            effects |= self.reconcile_now(sample.time_ms);
        }
        effects
    }

    /// Pointer released inside the viewport.
    ///
    /// Slow releases return to idle with a final reconciliation; fast ones
    /// start momentum. A release that never exceeded the tap slop stays idle
    /// and carries `TAP`, unless the press interrupted momentum.
    pub fn pointer_up(&mut self) -> MotionEffects {
        let caught = self.caught;
        let Some((mut effects, tap)) = self.release() else {
            return MotionEffects::empty();
        };
        if tap && !caught {
            effects |= MotionEffects::TAP;
        }
        effects
    }

    /// Pointer left the viewport while pressed. Like [`Self::pointer_up`] but
    /// never a tap.
    pub fn pointer_leave(&mut self) -> MotionEffects {
        self.release()
            .map(|(effects, _)| effects)
            .unwrap_or_default()
    }

    /// Advances momentum by one frame.
    ///
    /// Applies friction, integrates the offset over
    /// [`MotionConfig::frame_ms`], and bounces off the bounds. Returns
    /// `REQUEST_FRAME` while still moving; once settled, returns to idle with
    /// a mandatory `RECONCILE`. Outside momentum this is a no-op, so a stale
    /// frame callback is harmless.
    pub fn frame(&mut self, now_ms: f64) -> MotionEffects {
        if !self.momentum {
            return MotionEffects::empty();
        }
        self.last_time_ms = now_ms;

        self.velocity *= self.config.friction;
        let mut offset = self.offset + self.velocity * self.config.frame_ms;
        let (x, vx) = bounce(self.bounds.x, offset.x, self.velocity.x, self.config.bounce);
        let (y, vy) = bounce(self.bounds.y, offset.y, self.velocity.y, self.config.bounce);
        offset = Vec2::new(x, y);
        self.velocity = Vec2::new(vx, vy);

        let mut effects = self.apply_offset(offset);
        let min = self.config.min_velocity;
        if self.velocity.x.abs() <= min && self.velocity.y.abs() <= min {
            self.momentum = false;
            self.velocity = Vec2::ZERO;
            effects |= self.reconcile_now(now_ms);
        } else {
            effects |= MotionEffects::REQUEST_FRAME;
            if self.should_reconcile(now_ms) {
                effects |= self.reconcile_now(now_ms);
            }
        }
        effects
    }

    fn release(&mut self) -> Option<(MotionEffects, bool)> {
        let release = self.drag.end()?;
        self.caught = false;
        let velocity = if release.velocity.is_finite() {
            release.velocity
        } else {
            Vec2::ZERO
        };

        // A release inside the tap slop never glides, however fast the jitter.
        let threshold = self.config.release_threshold;
        let fast = velocity.x.abs() > threshold || velocity.y.abs() > threshold;
        if fast && !release.is_tap() {
            self.velocity = velocity;
            self.momentum = true;
            return Some((MotionEffects::REQUEST_FRAME, release.is_tap()));
        }

        self.velocity = Vec2::ZERO;
        let mut effects = MotionEffects::empty();
        if self.offset != self.last_reconcile_offset {
            effects |= self.reconcile_now(self.last_time_ms);
        }
        Some((effects, release.is_tap()))
    }

    fn apply_offset(&mut self, candidate: Vec2) -> MotionEffects {
        let clamped = self.bounds.clamp(candidate);
        if clamped == self.offset {
            return MotionEffects::empty();
        }
        self.offset = clamped;
        MotionEffects::REPOSITION
    }

    fn should_reconcile(&self, now_ms: f64) -> bool {
        let moved = self.offset - self.last_reconcile_offset;
        let distance = self.config.reconcile_distance;
        if moved.x.abs() > distance || moved.y.abs() > distance {
            return true;
        }
        match self.config.reconcile_interval_ms {
            Some(interval) => moved != Vec2::ZERO && now_ms - self.last_reconcile_ms >= interval,
            None => false,
        }
    }

    fn reconcile_now(&mut self, now_ms: f64) -> MotionEffects {
        self.mark_reconciled(now_ms);
        MotionEffects::RECONCILE
    }
}

/// Clamps one axis after integration, reflecting the velocity on contact.
fn bounce(bounds: AxisBounds, position: f64, velocity: f64, restitution: f64) -> (f64, f64) {
    if position > bounds.max {
        (bounds.max, -velocity * restitution)
    } else if position < bounds.min {
        (bounds.min, -velocity * restitution)
    } else {
        (position, velocity)
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Size, Vec2};
    use understory_event_state::pointer::PointerSample;
    use understory_tile_grid::OffsetBounds;

    use super::{MotionController, MotionEffects, MotionPhase, MotionState};
    use crate::MotionConfig;

    fn bounds() -> OffsetBounds {
        // 15x7 grid of 200px cells with 20px gaps in an 800x600 viewport.
        OffsetBounds::new(Size::new(800.0, 600.0), Size::new(3280.0, 1520.0))
    }

    fn controller() -> MotionController {
        MotionController::new(MotionConfig::default(), bounds())
    }

    fn sample(x: f64, y: f64, time_ms: f64) -> PointerSample {
        PointerSample::new(Point::new(x, y), time_ms)
    }

    fn run_momentum(motion: &mut MotionController, mut now: f64) -> (f64, MotionEffects) {
        let mut last = MotionEffects::empty();
        let mut frames = 0;
        while motion.phase() == MotionPhase::Momentum {
            now += 16.0;
            last = motion.frame(now);
            assert!(motion.bounds().contains(motion.offset()));
            frames += 1;
            assert!(frames < 10_000, "momentum never settled");
        }
        (now, last)
    }

    #[test]
    fn starts_idle_at_initial_offset() {
        let motion = controller();
        assert_eq!(motion.phase(), MotionPhase::Idle);
        assert_eq!(motion.state(), MotionState::Idle);
        assert_eq!(motion.offset(), Vec2::ZERO);
    }

    #[test]
    fn drag_follows_pointer_and_records_state() {
        let mut motion = controller();
        motion.pointer_down(sample(500.0, 400.0, 0.0));
        let fx = motion.pointer_move(sample(450.0, 380.0, 10.0));
        assert!(fx.contains(MotionEffects::REPOSITION));
        assert!(!fx.contains(MotionEffects::RECONCILE));
        assert_eq!(motion.offset(), Vec2::new(-50.0, -20.0));
        assert_eq!(motion.velocity(), Vec2::new(-5.0, -2.0));

        match motion.state() {
            MotionState::Dragging {
                start,
                start_offset,
                last,
            } => {
                assert_eq!(start.position, Point::new(500.0, 400.0));
                assert_eq!(start_offset, Vec2::ZERO);
                assert_eq!(last.position, Point::new(450.0, 380.0));
            }
            other => panic!("expected dragging, got {other:?}"),
        }
    }

    #[test]
    fn drag_reconciles_after_half_a_cell() {
        let mut motion = controller();
        motion.pointer_down(sample(500.0, 300.0, 0.0));
        let mut reconciles = |x: f64, time_ms: f64| {
            motion
                .pointer_move(sample(x, 300.0, time_ms))
                .contains(MotionEffects::RECONCILE)
        };
        assert!(!reconciles(450.0, 10.0));
        assert!(!reconciles(400.0, 20.0));
        // 101px of travel since the last reconciliation.
        assert!(reconciles(399.0, 30.0));
        // Travel is measured from that reconciliation onwards.
        assert!(!reconciles(350.0, 40.0));
    }

    #[test]
    fn time_based_throttle_is_opt_in() {
        let config = MotionConfig::default().with_reconcile_interval(Some(100.0));
        let mut motion = MotionController::new(config, bounds());
        motion.mark_reconciled(0.0);
        motion.pointer_down(sample(500.0, 300.0, 0.0));
        let fx = motion.pointer_move(sample(490.0, 300.0, 50.0));
        assert!(!fx.contains(MotionEffects::RECONCILE));
        let fx = motion.pointer_move(sample(480.0, 300.0, 120.0));
        assert!(fx.contains(MotionEffects::RECONCILE));
    }

    #[test]
    fn drag_is_clamped_to_bounds() {
        let mut motion = controller();
        motion.pointer_down(sample(0.0, 0.0, 0.0));
        motion.pointer_move(sample(500.0, 500.0, 10.0));
        assert_eq!(motion.offset(), Vec2::ZERO);
        motion.pointer_move(sample(-10_000.0, -10_000.0, 20.0));
        assert_eq!(motion.offset(), Vec2::new(-2480.0, -920.0));
    }

    #[test]
    fn stationary_press_is_a_tap() {
        let mut motion = controller();
        motion.pointer_down(sample(100.0, 100.0, 0.0));
        motion.pointer_move(sample(100.0, 100.0, 16.0));
        assert!(!motion.is_drag_gesture());

        let fx = motion.pointer_up();
        assert!(fx.contains(MotionEffects::TAP));
        assert!(!fx.contains(MotionEffects::RECONCILE));
        assert_eq!(motion.phase(), MotionPhase::Idle);
    }

    #[test]
    fn fast_jitter_inside_slop_taps_without_gliding() {
        let mut motion = controller();
        motion.pointer_down(sample(300.0, 100.0, 0.0));
        motion.pointer_move(sample(297.0, 100.0, 1.0));
        assert_eq!(motion.velocity(), Vec2::new(-3.0, 0.0));
        assert!(!motion.is_drag_gesture());

        let fx = motion.pointer_up();
        assert!(fx.contains(MotionEffects::TAP | MotionEffects::RECONCILE));
        assert!(!fx.contains(MotionEffects::REQUEST_FRAME));
        assert_eq!(motion.phase(), MotionPhase::Idle);
        assert_eq!(motion.velocity(), Vec2::ZERO);
        assert_eq!(motion.offset(), Vec2::new(-3.0, 0.0));
    }

    #[test]
    fn short_slow_drag_settles_without_momentum() {
        let mut motion = controller();
        motion.pointer_down(sample(300.0, 300.0, 0.0));
        motion.pointer_move(sample(294.0, 300.0, 1_000.0));
        assert!(motion.is_drag_gesture());

        let fx = motion.pointer_up();
        assert_eq!(fx, MotionEffects::RECONCILE);
        assert_eq!(motion.phase(), MotionPhase::Idle);
        assert_eq!(motion.offset(), Vec2::new(-6.0, 0.0));
        // The drag flag survives the release so the trailing click is ignored.
        assert!(motion.is_drag_gesture());
    }

    #[test]
    fn fast_release_starts_momentum_and_settles_with_reconcile() {
        let mut motion = controller();
        motion.pointer_down(sample(600.0, 300.0, 0.0));
        motion.pointer_move(sample(560.0, 290.0, 10.0));
        let fx = motion.pointer_up();
        assert_eq!(fx, MotionEffects::REQUEST_FRAME);
        assert_eq!(
            motion.state(),
            MotionState::Momentum {
                velocity: Vec2::new(-4.0, -1.0)
            }
        );

        let before = motion.offset();
        let fx = motion.frame(26.0);
        assert!(fx.contains(MotionEffects::REQUEST_FRAME | MotionEffects::REPOSITION));
        // Friction applies before integration.
        assert!((motion.offset().x - (before.x - 4.0 * 0.95 * 16.0)).abs() < 1e-9);

        let (_, last) = run_momentum(&mut motion, 26.0);
        assert!(last.contains(MotionEffects::RECONCILE));
        assert!(!last.contains(MotionEffects::REQUEST_FRAME));
        assert_eq!(motion.velocity(), Vec2::ZERO);
    }

    #[test]
    fn momentum_bounces_off_bounds() {
        let mut motion = controller();
        motion.pointer_down(sample(100.0, 100.0, 0.0));
        motion.pointer_move(sample(110.0, 100.0, 10.0));
        motion.pointer_up();
        // Already at x = 0 moving right: first frame hits the bound.
        motion.frame(16.0);
        assert_eq!(motion.offset().x, 0.0);
        assert!(motion.velocity().x < 0.0);
        assert!((motion.velocity().x + 0.95 * 0.5).abs() < 1e-9);
    }

    #[test]
    fn extreme_flick_never_tunnels_through_bounds() {
        let mut motion = controller();
        motion.pointer_down(sample(500.0, 300.0, 0.0));
        // 10000 px/ms on both axes.
        motion.pointer_move(sample(500.0 - 10_000.0, 300.0 - 10_000.0, 1.0));
        assert!(bounds().contains(motion.offset()));
        motion.pointer_up();
        assert_eq!(motion.phase(), MotionPhase::Momentum);
        run_momentum(&mut motion, 1.0);
        assert!(bounds().contains(motion.offset()));
    }

    #[test]
    fn press_during_momentum_cancels_frame_and_is_not_a_tap() {
        let mut motion = controller();
        motion.pointer_down(sample(600.0, 300.0, 0.0));
        motion.pointer_move(sample(500.0, 300.0, 10.0));
        motion.pointer_up();
        motion.frame(26.0);

        let fx = motion.pointer_down(sample(300.0, 300.0, 40.0));
        assert_eq!(fx, MotionEffects::CANCEL_FRAME);
        assert_eq!(motion.phase(), MotionPhase::Dragging);
        // A stale frame callback does nothing.
        assert_eq!(motion.frame(42.0), MotionEffects::empty());

        let fx = motion.pointer_up();
        assert!(!fx.contains(MotionEffects::TAP));
        assert_eq!(motion.phase(), MotionPhase::Idle);
    }

    #[test]
    fn pointer_leave_releases_without_tap() {
        let mut motion = controller();
        motion.pointer_down(sample(100.0, 100.0, 0.0));
        let fx = motion.pointer_leave();
        assert!(!fx.contains(MotionEffects::TAP));
        assert_eq!(motion.phase(), MotionPhase::Idle);
        // Nothing to release twice.
        assert_eq!(motion.pointer_up(), MotionEffects::empty());
    }

    #[test]
    fn moves_without_press_are_ignored() {
        let mut motion = controller();
        assert_eq!(
            motion.pointer_move(sample(10.0, 10.0, 5.0)),
            MotionEffects::empty()
        );
        assert_eq!(motion.offset(), Vec2::ZERO);
    }

    #[test]
    fn shrinking_bounds_reclamps_offset() {
        let mut motion = controller();
        motion.set_offset(Vec2::new(-2000.0, -900.0));
        let fx = motion.set_bounds(OffsetBounds::new(
            Size::new(1600.0, 1200.0),
            Size::new(3280.0, 1520.0),
        ));
        assert_eq!(fx, MotionEffects::REPOSITION);
        assert_eq!(motion.offset(), Vec2::new(-1680.0, -320.0));
    }
}

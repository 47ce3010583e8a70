// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Momentum: drag and momentum panning for tile grids.
//!
//! [`MotionController`] owns the 2D offset of a pannable grid and moves it
//! through three phases:
//!
//! - **Idle**: nothing moves.
//! - **Dragging**: the offset follows the pointer, clamped to [`OffsetBounds`].
//! - **Momentum**: after a fast release, the offset keeps gliding with
//!   exponential friction and bounces off the bounds until it settles.
//!
//! The controller never touches a renderer. Every input returns a set of
//! [`MotionEffects`] telling the host what to do next: move the grid
//! (`REPOSITION`), recompute realized tiles (`RECONCILE`), schedule or cancel
//! the next animation frame, or treat a release as a tap.
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use understory_event_state::pointer::PointerSample;
//! use understory_momentum::{MotionConfig, MotionController, MotionEffects, MotionPhase};
//! use understory_tile_grid::OffsetBounds;
//!
//! let bounds = OffsetBounds::new(Size::new(800.0, 600.0), Size::new(3280.0, 1520.0));
//! let mut motion = MotionController::new(MotionConfig::default(), bounds);
//!
//! motion.pointer_down(PointerSample::new(Point::new(400.0, 300.0), 0.0));
//! let fx = motion.pointer_move(PointerSample::new(Point::new(300.0, 300.0), 10.0));
//! assert!(fx.contains(MotionEffects::REPOSITION));
//! assert_eq!(motion.offset().x, -100.0);
//!
//! // Released at 10 px/ms: momentum takes over.
//! let fx = motion.pointer_up();
//! assert!(fx.contains(MotionEffects::REQUEST_FRAME));
//! assert_eq!(motion.phase(), MotionPhase::Momentum);
//!
//! // Drive frames until the glide settles.
//! let mut now = 10.0;
//! while motion.phase() == MotionPhase::Momentum {
//!     now += 16.0;
//!     motion.frame(now);
//! }
//! assert!(bounds.contains(motion.offset()));
//! ```
//!
//! This crate is `no_std`.

#![no_std]

#[cfg(feature = "std")]
extern crate std;

mod config;
mod controller;

pub use config::MotionConfig;
pub use controller::{MotionController, MotionEffects, MotionPhase, MotionState};
pub use understory_tile_grid::OffsetBounds;

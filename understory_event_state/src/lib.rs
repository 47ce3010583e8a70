// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Event State: pointer sampling and drag gesture state.
//!
//! This crate provides small, focused state holders for interactions that
//! need to be tracked across several input events:
//!
//! - [`pointer`]: a single timestamped pointer position, the common currency
//!   for mouse, pen and touch input.
//! - [`drag`]: track a press-move-release gesture, its movement deltas, its
//!   instantaneous velocity, and whether it moved far enough to count as a
//!   drag rather than a tap.
//!
//! ## Design Philosophy
//!
//! Mouse and touch input differ only in how a position is extracted from the
//! platform event. Hosts convert either into a [`pointer::PointerSample`] and
//! feed it to the same state machine, so there is exactly one code path for
//! gesture handling.
//!
//! The crate does not assume any particular UI framework or event system.
//!
//! ## Drag Operations
//!
//! ```rust
//! use kurbo::Point;
//! use understory_event_state::drag::DragState;
//! use understory_event_state::pointer::PointerSample;
//!
//! let mut drag = DragState::default();
//! drag.start(PointerSample::new(Point::new(10.0, 10.0), 0.0));
//!
//! let update = drag.update(PointerSample::new(Point::new(16.0, 10.0), 4.0), 5.0).unwrap();
//! assert_eq!(update.total.x, 6.0);
//! // 6px in 4ms.
//! assert_eq!(update.velocity.x, 1.5);
//! // Moved past the 5px slop: this is a drag, not a tap.
//! assert!(drag.exceeded_slop());
//! ```
//!
//! This crate is `no_std` compatible.

#![no_std]

#[cfg(feature = "std")]
extern crate std;

pub mod drag;
pub mod pointer;

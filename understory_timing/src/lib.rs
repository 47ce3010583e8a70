// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Timing: host-agnostic timer queue primitives.
//!
//! UI runtimes need a handful of "do this later" jobs: remove a node once its
//! exit animation finished, refresh a panel every few seconds, reset a
//! transient label. Browsers offer `setTimeout`, native toolkits offer their
//! own timers, tests want none of them.
//!
//! [`TimerQueue`] keeps those jobs as plain data. The host owns the clock:
//! it schedules payloads at absolute deadlines, then periodically calls
//! [`TimerQueue::pop_due`] with the current time and handles whatever
//! comes out. Every scheduled entry is identified by a generational
//! [`TimerId`], so a cancelled or fired timer can never be confused with a
//! newer one that reused its slot.
//!
//! ```rust
//! use understory_timing::TimerQueue;
//!
//! let mut timers = TimerQueue::new();
//! let fade = timers.schedule(300.0, "remove tile 7");
//! let banner = timers.schedule(1_000.0, "refresh banner");
//!
//! // The tile came back before its exit animation ended.
//! assert_eq!(timers.cancel(fade), Some("remove tile 7"));
//!
//! assert_eq!(timers.pop_due(500.0), None);
//! assert_eq!(timers.pop_due(1_000.0), Some((banner, "refresh banner")));
//! assert!(timers.is_empty());
//! ```
//!
//! Times are `f64` milliseconds from any monotonic origin. This crate is
//! `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod queue;

pub use queue::{TimerId, TimerQueue};

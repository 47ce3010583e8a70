// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Tile Grid: core 2D virtualization primitives for fixed-pitch grids.
//!
//! This crate provides a small, renderer-agnostic core for virtualizing a dense,
//! row-major grid of equally sized cells indexed `0..item_count`. It is the 2D
//! sibling of a virtual list: given a translation of the grid inside a viewport,
//! it answers which cells need to exist right now.
//!
//! The core concepts are:
//!
//! - [`GridSpec`]: column count, cell size, gap and item count, plus the derived
//!   row count, pitch and total content size.
//! - [`compute_visible_range`]: given the grid offset, viewport size and a buffer
//!   (in cells), returns the [`VisibleRange`] of rows and columns to realize.
//! - [`VisibleSet`]: the set of indices currently realized. [`VisibleSet::reconcile`]
//!   diffs it against a freshly computed set and returns a [`Reconciliation`] of
//!   indices to create and destroy.
//! - [`OffsetBounds`]: the valid range for the grid offset so the grid keeps
//!   covering the viewport (or stays centered when it is smaller than it).
//!
//! This crate deliberately does **not** know about DOM nodes, widgets or images.
//! Host frameworks are responsible for:
//!
//! - Owning the actual tile instances.
//! - Calling [`compute_visible_range`] when the offset or viewport changes.
//! - Applying the returned [`Reconciliation`] to create/destroy tiles.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Size, Vec2};
//! use understory_tile_grid::{GridSpec, VisibleSet, compute_visible_range};
//!
//! // 100 items in 15 columns of 200px cells with a 20px gap.
//! let spec = GridSpec::new(15, 200.0, 20.0, 100).unwrap();
//! assert_eq!(spec.rows(), 7);
//!
//! let range = compute_visible_range(Vec2::ZERO, Size::new(800.0, 600.0), &spec, 1);
//! assert_eq!(range.columns(), 0..6);
//! assert_eq!(range.rows(), 0..5);
//!
//! let mut visible = VisibleSet::new();
//! let diff = visible.reconcile(range.to_set());
//! assert_eq!(diff.to_add.len(), 30);
//! assert!(diff.to_remove.is_empty());
//!
//! // Same range again: nothing to do.
//! assert!(visible.reconcile(range.to_set()).is_empty());
//! ```
//!
//! Offsets follow the CSS `translate` convention: the grid origin is drawn at
//! `offset` in viewport space, so scrolling right means a more negative `x`.
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod bounds;
mod range;
mod spec;
mod visible_set;

pub use bounds::{AxisBounds, OffsetBounds};
pub use range::{VisibleRange, compute_visible_range};
pub use spec::{GridSpec, GridSpecError};
pub use visible_set::{Reconciliation, VisibleSet};

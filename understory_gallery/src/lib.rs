// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Gallery: a virtualized, drag-to-pan image tile grid.
//!
//! This crate wires the Understory kernels into a complete gallery surface:
//!
//! - [`understory_tile_grid`] decides which cells must exist for the current offset.
//! - [`understory_momentum`] turns pointer input into offset changes, with momentum.
//! - [`understory_timing`] runs delayed work such as tile exit animations.
//!
//! [`GridViewController`] is the single owner of all gallery state. A host
//! (a browser DOM binding, a native toolkit, or a test double) implements
//! [`GalleryHost`] to perform the actual side effects, and forwards its input
//! events, animation frames, image-load completions and timer ticks back into
//! the controller.
//!
//! ## Lifecycle
//!
//! 1. Create the controller with a [`GalleryConfig`], a [`Manifest`] (possibly
//!    empty while it is still being fetched) and the viewport size.
//! 2. Forward pointer input as [`PointerSample`]s: `pointer_down`,
//!    `pointer_move`, `pointer_up`, `pointer_leave`. Mouse and touch share
//!    the same path.
//! 3. When the controller asks for an animation frame through
//!    [`GalleryHost::request_frame`], call
//!    [`GridViewController::animation_frame`] from it.
//! 4. Call [`GridViewController::advance_timers`] regularly (or at
//!    [`GridViewController::next_timer_deadline`]).
//! 5. Report image loads and clipboard results with
//!    [`GridViewController::image_loaded`] and
//!    [`GridViewController::copy_finished`].
//!
//! ## Failure model
//!
//! Nothing here is fatal. A malformed manifest yields an empty grid, a failed
//! image load leaves the placeholder, a failed host operation is logged and
//! retried on the next reconciliation, and late completions for tiles that no
//! longer exist are dropped. Diagnostics go through [`tracing`].
//!
//! [`PointerSample`]: understory_event_state::pointer::PointerSample

mod ads;
mod config;
mod controller;
mod host;
mod lightbox;
mod manifest;
mod virtualizer;

pub use ads::{BannerSchedule, ViewportClass};
pub use config::GalleryConfig;
pub use controller::GridViewController;
pub use host::{
    CopyFeedback, CopyTicket, FrameHandle, GalleryHost, HostError, HostOperation, LoadTicket,
    TileContent,
};
pub use lightbox::{CloseReason, CopyState, Lightbox, LightboxState};
pub use manifest::{Manifest, ManifestError, ManifestItem};
pub use virtualizer::{ImageState, ReconcileReport, ViewportVirtualizer};

pub use understory_event_state::pointer::PointerSample;
pub use understory_momentum::{MotionConfig, MotionPhase};

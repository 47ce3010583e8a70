// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The boundary between the gallery engine and whatever draws it.

use core::fmt;

use kurbo::{Point, Size, Vec2};

use crate::ads::ViewportClass;
use crate::manifest::ManifestItem;

/// Host operation that can fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostOperation {
    /// [`GalleryHost::create_tile`].
    CreateTile,
    /// [`GalleryHost::begin_image_load`] or the load it started.
    LoadImage,
    /// [`GalleryHost::copy_image`] or the clipboard write it started.
    CopyImage,
}

impl fmt::Display for HostOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CreateTile => "create tile",
            Self::LoadImage => "load image",
            Self::CopyImage => "copy image",
        })
    }
}

/// Error reported by a [`GalleryHost`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostError {
    operation: HostOperation,
    message: String,
}

impl HostError {
    /// Creates an error for `operation` with a human readable `message`.
    pub fn new(operation: HostOperation, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }

    /// The operation that failed.
    #[must_use]
    pub fn operation(&self) -> HostOperation {
        self.operation
    }

    /// Host supplied detail.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to {}: {}", self.operation, self.message)
    }
}

impl core::error::Error for HostError {}

/// Identifies one image load. Hand it back through
/// [`crate::GridViewController::image_loaded`] when the load finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value, for hosts that must round-trip the ticket through foreign code.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Identifies one clipboard write. Hand it back through
/// [`crate::GridViewController::copy_finished`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CopyTicket(u64);

impl CopyTicket {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Host-issued handle for a requested animation frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    /// Wraps a host frame id (for example the value `requestAnimationFrame` returned).
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Everything a host needs to build one tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileContent<'a> {
    /// Grid index of the tile.
    pub index: usize,
    /// Image reference from the manifest.
    pub image: &'a str,
    /// Caption from the manifest.
    pub caption: &'a str,
    /// Top-left corner in grid space.
    pub origin: Point,
    /// Tile size.
    pub size: Size,
}

/// Copy button feedback shown in the lightbox.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CopyFeedback {
    /// The button is available.
    #[default]
    Ready,
    /// A clipboard write is in flight.
    Copying,
    /// The last copy succeeded.
    Copied,
}

/// Side effects the gallery asks of its environment.
///
/// All methods are called synchronously from [`crate::GridViewController`].
/// Asynchronous work (image loads, clipboard writes, animation frames) is
/// started here and reported back through the controller.
pub trait GalleryHost {
    /// Host handle for one tile.
    type Node;

    /// Sizes the grid container.
    fn set_grid_size(&mut self, size: Size);

    /// Applies the grid translation.
    fn set_grid_offset(&mut self, offset: Vec2);

    /// Shows or hides the "grabbing" state while a pointer is pressed.
    fn set_dragging(&mut self, dragging: bool) {
        let _ = dragging;
    }

    /// Creates and attaches a tile rendered with its placeholder.
    ///
    /// The node should play its entry animation on its own.
    fn create_tile(&mut self, tile: &TileContent<'_>) -> Result<Self::Node, HostError>;

    /// Starts loading `image` for `node`. Completion is reported with `ticket`.
    fn begin_image_load(
        &mut self,
        node: &Self::Node,
        image: &str,
        ticket: LoadTicket,
    ) -> Result<(), HostError>;

    /// Swaps the placeholder of `node` for its loaded image.
    fn show_tile_image(&mut self, node: &Self::Node);

    /// Starts the exit animation of `node`.
    fn mark_tile_exiting(&mut self, node: &Self::Node);

    /// Reverts the exit animation of `node`; it is visible again.
    fn cancel_tile_exit(&mut self, node: &Self::Node);

    /// Detaches and drops `node`.
    fn remove_tile(&mut self, node: Self::Node);

    /// Requests one animation frame.
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancels a frame returned by [`GalleryHost::request_frame`].
    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Shows the lightbox with the full image and caption of `item`.
    fn open_lightbox(&mut self, item: &ManifestItem, index: usize);

    /// Hides the lightbox.
    fn close_lightbox(&mut self);

    /// Updates the lightbox copy button.
    fn set_copy_feedback(&mut self, feedback: CopyFeedback) {
        let _ = feedback;
    }

    /// Starts copying the image of `item` to the clipboard.
    fn copy_image(&mut self, item: &ManifestItem, ticket: CopyTicket) -> Result<(), HostError>;

    /// Shows a transient, user visible message.
    fn notify(&mut self, message: &str);

    /// Refreshes the banner ad for `class`.
    fn refresh_banner(&mut self, class: ViewportClass) {
        let _ = class;
    }

    /// Swaps the ad shown inside the lightbox.
    fn swap_modal_ad(&mut self) {}
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser DOM host for the Understory gallery.
//!
//! This crate provides a [`GalleryHost`] implementation backed by `web_sys`
//! when targeting `wasm32`. On other targets it is empty.
//!
//! Tiles are absolutely positioned `<div>`s inside the grid element, each with
//! an `<img>` that stays hidden (class `placeholder`) until it loads. Entry and
//! exit animations are left to CSS through the `entering` and `exiting`
//! classes. Ad slots are opaque: the host only dispatches
//! `gallery-banner-refresh` and `gallery-modal-ad-swap` events on the banner
//! and lightbox elements.
//!
//! Asynchronous completions (image loads, clipboard writes, animation frames)
//! are queued by the host and delivered to the controller by
//! [`dispatch_events`], which [`attach`] wires up automatically.
//!
//! ```no_run
//! #[cfg(target_arch = "wasm32")]
//! fn start(
//!     elements: understory_gallery_web::WebHostElements,
//!     manifest_json: &str,
//! ) -> Result<understory_gallery_web::Listeners, wasm_bindgen::JsValue> {
//!     use understory_gallery::{GalleryConfig, Manifest};
//!
//!     let manifest = Manifest::from_json_or_empty(manifest_json);
//!     understory_gallery_web::attach(GalleryConfig::default(), manifest, elements)
//! }
//! ```
//!
//! [`GalleryHost`]: understory_gallery::GalleryHost

#[cfg(target_arch = "wasm32")]
mod dom;

#[cfg(target_arch = "wasm32")]
pub use dom::{HostEvent, Listeners, WebHost, WebHostElements, attach, dispatch_events};

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use kurbo::{Point, Size, Vec2};
use understory_event_state::pointer::PointerSample;
use understory_momentum::{MotionController, MotionEffects, MotionPhase};
use understory_tile_grid::{GridSpec, GridSpecError, OffsetBounds};
use understory_timing::TimerQueue;

use crate::ads::BannerSchedule;
use crate::config::GalleryConfig;
use crate::host::{CopyTicket, FrameHandle, GalleryHost, HostError, LoadTicket};
use crate::lightbox::{CloseReason, Lightbox};
use crate::manifest::Manifest;
use crate::virtualizer::{ReconcileReport, ViewportVirtualizer};

/// Delayed work owned by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GalleryTimer {
    BannerRefresh,
    CopyFeedbackReset(CopyTicket),
}

/// One mounted gallery.
///
/// Owns the manifest, the grid geometry, the motion state machine, the
/// realized tiles, the lightbox, the banner schedule and the host. Every
/// external event enters through a method here; every side effect leaves
/// through [`GalleryHost`].
///
/// Pointer positions are relative to the viewport's top-left corner.
pub struct GridViewController<H: GalleryHost> {
    config: GalleryConfig,
    manifest: Manifest,
    viewport: Size,
    motion: MotionController,
    virtualizer: ViewportVirtualizer<H::Node>,
    lightbox: Lightbox,
    banner: BannerSchedule,
    timers: TimerQueue<GalleryTimer>,
    frame: Option<FrameHandle>,
    host: H,
}

impl<H: GalleryHost> fmt::Debug for GridViewController<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridViewController")
            .field("items", &self.manifest.len())
            .field("viewport", &self.viewport)
            .field("motion", &self.motion)
            .field("tiles", &self.virtualizer.tile_count())
            .field("lightbox", &self.lightbox)
            .field("banner", &self.banner)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

impl<H: GalleryHost> GridViewController<H> {
    /// Mounts a gallery: sizes and centers the grid, realizes the initially
    /// visible tiles and starts the banner schedule.
    pub fn new(
        config: GalleryConfig,
        manifest: Manifest,
        viewport: Size,
        host: H,
        now_ms: f64,
    ) -> Result<Self, GridSpecError> {
        let spec = config.grid_spec(manifest.len())?;
        let bounds = OffsetBounds::new(viewport, spec.total_size());
        let mut this = Self {
            motion: MotionController::new(config.motion, bounds),
            virtualizer: ViewportVirtualizer::new(
                spec,
                config.buffer_cells,
                config.exit_animation_ms,
            ),
            banner: BannerSchedule::new(config.mobile_breakpoint, config.banner_refresh_ms),
            lightbox: Lightbox::new(),
            timers: TimerQueue::new(),
            frame: None,
            config,
            manifest,
            viewport,
            host,
        };
        this.host.set_grid_size(spec.total_size());
        this.host.set_grid_offset(this.motion.offset());
        this.reconcile(now_ms);
        this.banner
            .start(viewport.width, now_ms, &mut this.host, &mut this.timers);
        tracing::debug!(
            items = spec.item_count(),
            rows = spec.rows(),
            columns = spec.columns(),
            "gallery mounted"
        );
        Ok(this)
    }

    /// Configuration.
    #[must_use]
    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    /// Loaded items.
    #[must_use]
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Grid geometry.
    #[must_use]
    pub fn grid_spec(&self) -> &GridSpec {
        self.virtualizer.spec()
    }

    /// Viewport size.
    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Current grid offset.
    #[must_use]
    pub fn offset(&self) -> Vec2 {
        self.motion.offset()
    }

    /// Motion phase.
    #[must_use]
    pub fn phase(&self) -> MotionPhase {
        self.motion.phase()
    }

    /// Motion state machine.
    #[must_use]
    pub fn motion(&self) -> &MotionController {
        &self.motion
    }

    /// Realized tiles.
    #[must_use]
    pub fn virtualizer(&self) -> &ViewportVirtualizer<H::Node> {
        &self.virtualizer
    }

    /// Lightbox.
    #[must_use]
    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    /// Banner schedule.
    #[must_use]
    pub fn banner(&self) -> &BannerSchedule {
        &self.banner
    }

    /// Outstanding animation frame, if any.
    #[must_use]
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.frame
    }

    /// The host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Unmounts the gallery, returning the host. Tiles are removed and any
    /// pending frame is cancelled.
    pub fn into_host(mut self) -> H {
        if let Some(handle) = self.frame.take() {
            self.host.cancel_frame(handle);
        }
        self.virtualizer.clear(&mut self.host);
        self.host
    }

    /// Replaces the items, rebuilding the grid from its initial position.
    ///
    /// The lightbox closes, in-flight loads are forgotten, and the new grid
    /// is realized right away.
    pub fn load_manifest(&mut self, manifest: Manifest, now_ms: f64) {
        self.lightbox
            .close(CloseReason::CloseButton, &mut self.host, &mut self.timers);
        let spec = self.virtualizer.spec().with_item_count(manifest.len());
        self.manifest = manifest;
        self.virtualizer.reset(spec, &mut self.host);
        self.host.set_grid_size(spec.total_size());

        let bounds = OffsetBounds::new(self.viewport, spec.total_size());
        let mut effects = self.motion.set_bounds(bounds);
        effects |= self.motion.set_offset(bounds.initial());
        self.apply(effects | MotionEffects::REPOSITION, now_ms, None);
        self.reconcile(now_ms);
        tracing::debug!(items = spec.item_count(), "manifest loaded");
    }

    /// Applies a new viewport size.
    ///
    /// The grid is re-centered horizontally (or returned to its left edge
    /// when wider than the viewport), the vertical offset is clamped, and
    /// tiles are reconciled for the new view.
    pub fn resize(&mut self, viewport: Size, now_ms: f64) {
        self.viewport = viewport;
        let bounds = OffsetBounds::new(viewport, self.virtualizer.spec().total_size());
        let mut effects = self.motion.set_bounds(bounds);
        let offset = Vec2::new(bounds.x.max, self.motion.offset().y);
        effects |= self.motion.set_offset(offset);
        self.apply(effects, now_ms, None);
        self.reconcile(now_ms);
        self.banner
            .resize(viewport.width, now_ms, &mut self.host, &mut self.timers);
    }

    /// Pointer pressed inside the viewport.
    pub fn pointer_down(&mut self, sample: PointerSample) {
        let catching = self.motion.phase() == MotionPhase::Momentum;
        let effects = self.motion.pointer_down(sample);
        tracing::debug!(
            x = sample.position.x,
            y = sample.position.y,
            catching,
            "drag started"
        );
        self.host.set_dragging(true);
        self.apply(effects, sample.time_ms, None);
    }

    /// Pointer moved. Ignored unless pressed.
    pub fn pointer_move(&mut self, sample: PointerSample) {
        let effects = self.motion.pointer_move(sample);
        self.apply(effects, sample.time_ms, None);
    }

    /// Pointer released at `sample`. A release without drag opens the tile
    /// under the pointer.
    pub fn pointer_up(&mut self, sample: PointerSample) {
        if self.motion.phase() != MotionPhase::Dragging {
            return;
        }
        let effects = self.motion.pointer_up();
        self.host.set_dragging(false);
        self.log_release();
        self.apply(effects, sample.time_ms, Some(sample.position));
    }

    /// Pointer left the viewport. Ends a drag like a release but never taps.
    pub fn pointer_leave(&mut self, now_ms: f64) {
        if self.motion.phase() != MotionPhase::Dragging {
            return;
        }
        let effects = self.motion.pointer_leave();
        self.host.set_dragging(false);
        self.log_release();
        self.apply(effects, now_ms, None);
    }

    /// Runs the animation frame `handle` that this controller requested.
    ///
    /// Frames that were cancelled or superseded are ignored.
    pub fn animation_frame(&mut self, handle: FrameHandle, now_ms: f64) {
        if self.frame != Some(handle) {
            tracing::trace!(handle = handle.get(), "ignoring stale animation frame");
            return;
        }
        self.frame = None;
        let effects = self.motion.frame(now_ms);
        if self.motion.phase() == MotionPhase::Idle && effects.contains(MotionEffects::RECONCILE) {
            tracing::debug!(
                x = self.motion.offset().x,
                y = self.motion.offset().y,
                "momentum settled"
            );
        }
        self.apply(effects, now_ms, None);
    }

    /// A tile was clicked. Opens the lightbox unless the click ends a drag.
    pub fn click_tile(&mut self, index: usize) -> bool {
        if self.motion.is_drag_gesture() {
            tracing::trace!(index, "click suppressed after drag");
            return false;
        }
        self.lightbox
            .open(index, &self.manifest, &mut self.host, &mut self.timers)
    }

    /// Closes the lightbox.
    pub fn close_lightbox(&mut self, reason: CloseReason) -> bool {
        self.lightbox.close(reason, &mut self.host, &mut self.timers)
    }

    /// Copies the image on display in the lightbox. Also swaps the lightbox ad.
    pub fn copy_image(&mut self) -> Option<CopyTicket> {
        self.lightbox
            .copy(&self.manifest, &mut self.host, &mut self.timers)
    }

    /// Reports the result of the clipboard write `ticket`.
    pub fn copy_finished(
        &mut self,
        ticket: CopyTicket,
        result: Result<(), HostError>,
        now_ms: f64,
    ) -> bool {
        self.lightbox.copy_finished(
            ticket,
            result,
            self.config.copy_feedback_ms,
            now_ms,
            &mut self.host,
            &mut self.timers,
        )
    }

    /// Reports the end of the image load `ticket`. Returns `true` if the
    /// image is now showing.
    pub fn image_loaded(&mut self, ticket: LoadTicket, result: Result<(), HostError>) -> bool {
        self.virtualizer
            .image_loaded(ticket, result, &mut self.host)
    }

    /// Fires every timer due at `now_ms`.
    pub fn advance_timers(&mut self, now_ms: f64) {
        self.virtualizer.advance(now_ms, &mut self.host);
        while let Some((id, timer)) = self.timers.pop_due(now_ms) {
            match timer {
                GalleryTimer::BannerRefresh => {
                    self.banner
                        .fire(id, now_ms, &mut self.host, &mut self.timers);
                }
                GalleryTimer::CopyFeedbackReset(ticket) => {
                    self.lightbox.feedback_expired(ticket, &mut self.host);
                }
            }
        }
    }

    /// Earliest pending timer deadline.
    pub fn next_timer_deadline(&mut self) -> Option<f64> {
        match (self.virtualizer.next_deadline(), self.timers.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Reconciles tiles with the current offset right away.
    pub fn reconcile(&mut self, now_ms: f64) -> ReconcileReport {
        let report = self.virtualizer.update(
            self.motion.offset(),
            self.viewport,
            &self.manifest,
            now_ms,
            &mut self.host,
        );
        self.motion.mark_reconciled(now_ms);
        report
    }

    fn apply(&mut self, effects: MotionEffects, now_ms: f64, release_at: Option<Point>) {
        if effects.contains(MotionEffects::CANCEL_FRAME) {
            if let Some(handle) = self.frame.take() {
                self.host.cancel_frame(handle);
            }
        }
        if effects.contains(MotionEffects::REPOSITION) {
            self.host.set_grid_offset(self.motion.offset());
        }
        if effects.contains(MotionEffects::RECONCILE) {
            self.reconcile(now_ms);
        }
        if effects.contains(MotionEffects::REQUEST_FRAME) && self.frame.is_none() {
            self.frame = Some(self.host.request_frame());
        }
        if effects.contains(MotionEffects::TAP) {
            if let Some(position) = release_at {
                self.tap(position);
            }
        }
    }

    fn tap(&mut self, position: Point) {
        let grid_point = position - self.motion.offset();
        match self.virtualizer.spec().index_at(grid_point) {
            Some(index) => {
                self.lightbox
                    .open(index, &self.manifest, &mut self.host, &mut self.timers);
            }
            None => tracing::trace!(x = grid_point.x, y = grid_point.y, "tap outside tiles"),
        }
    }

    fn log_release(&self) {
        match self.motion.phase() {
            MotionPhase::Momentum => {
                let velocity = self.motion.velocity();
                tracing::debug!(vx = velocity.x, vy = velocity.y, "momentum started");
            }
            _ => tracing::debug!("drag released"),
        }
    }
}

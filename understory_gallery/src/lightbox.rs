// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use understory_timing::{TimerId, TimerQueue};

use crate::controller::GalleryTimer;
use crate::host::{CopyFeedback, CopyTicket, GalleryHost, HostError};
use crate::manifest::Manifest;

/// Why the lightbox closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseReason {
    /// The close control was activated.
    CloseButton,
    /// The backdrop around the image was clicked.
    Backdrop,
    /// Escape was pressed.
    Escape,
}

/// Copy action state inside an open lightbox.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyState {
    /// Ready to copy.
    Ready,
    /// Waiting for the clipboard write identified by the ticket.
    Copying(CopyTicket),
    /// Showing the "copied" confirmation until its reset timer fires.
    Copied(CopyTicket),
}

/// Lightbox state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightboxState {
    /// Hidden.
    Closed,
    /// Showing item `index`.
    Open {
        /// Manifest index on display.
        index: usize,
        /// Copy action state.
        copy: CopyState,
    },
}

/// Modal detail view for a single item.
#[derive(Clone, Debug)]
pub struct Lightbox {
    state: LightboxState,
    reset_timer: Option<TimerId>,
    next_ticket: u64,
}

impl Default for Lightbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lightbox {
    /// Creates a closed lightbox.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: LightboxState::Closed,
            reset_timer: None,
            next_ticket: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LightboxState {
        self.state
    }

    /// Index on display, if open.
    #[must_use]
    pub fn open_index(&self) -> Option<usize> {
        match self.state {
            LightboxState::Open { index, .. } => Some(index),
            LightboxState::Closed => None,
        }
    }

    /// Returns `true` if the lightbox is showing.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open_index().is_some()
    }

    /// Shows item `index`. Opening the item already on display does nothing.
    pub(crate) fn open<H: GalleryHost>(
        &mut self,
        index: usize,
        manifest: &Manifest,
        host: &mut H,
        timers: &mut TimerQueue<GalleryTimer>,
    ) -> bool {
        if self.open_index() == Some(index) {
            return false;
        }
        let Some(item) = manifest.get(index) else {
            return false;
        };
        self.cancel_reset(timers);
        self.state = LightboxState::Open {
            index,
            copy: CopyState::Ready,
        };
        tracing::debug!(index, "lightbox opened");
        host.open_lightbox(item, index);
        host.set_copy_feedback(CopyFeedback::Ready);
        true
    }

    pub(crate) fn close<H: GalleryHost>(
        &mut self,
        reason: CloseReason,
        host: &mut H,
        timers: &mut TimerQueue<GalleryTimer>,
    ) -> bool {
        let Some(index) = self.open_index() else {
            return false;
        };
        self.cancel_reset(timers);
        self.state = LightboxState::Closed;
        tracing::debug!(index, ?reason, "lightbox closed");
        host.close_lightbox();
        true
    }

    /// Starts a clipboard write of the item on display.
    ///
    /// Ignored while closed or while a write is in flight. Copying again
    /// while the confirmation shows starts a new write.
    pub(crate) fn copy<H: GalleryHost>(
        &mut self,
        manifest: &Manifest,
        host: &mut H,
        timers: &mut TimerQueue<GalleryTimer>,
    ) -> Option<CopyTicket> {
        let LightboxState::Open { index, copy } = self.state else {
            return None;
        };
        if matches!(copy, CopyState::Copying(_)) {
            return None;
        }
        let item = manifest.get(index)?;
        self.cancel_reset(timers);

        let ticket = CopyTicket::new(self.next_ticket);
        self.next_ticket += 1;
        self.set_copy(index, CopyState::Copying(ticket));
        host.swap_modal_ad();
        host.set_copy_feedback(CopyFeedback::Copying);

        if let Err(err) = host.copy_image(item, ticket) {
            self.copy_failed(index, &err, host);
            return None;
        }
        Some(ticket)
    }

    /// Applies the result of the clipboard write `ticket`.
    ///
    /// Results for writes that were superseded, or that finish after the
    /// lightbox closed, are dropped.
    pub(crate) fn copy_finished<H: GalleryHost>(
        &mut self,
        ticket: CopyTicket,
        result: Result<(), HostError>,
        feedback_ms: f64,
        now_ms: f64,
        host: &mut H,
        timers: &mut TimerQueue<GalleryTimer>,
    ) -> bool {
        let LightboxState::Open { index, copy } = self.state else {
            return false;
        };
        if copy != CopyState::Copying(ticket) {
            tracing::trace!(ticket = ticket.get(), "dropping stale copy result");
            return false;
        }
        match result {
            Ok(()) => {
                self.set_copy(index, CopyState::Copied(ticket));
                host.set_copy_feedback(CopyFeedback::Copied);
                self.reset_timer = Some(timers.schedule_after(
                    now_ms,
                    feedback_ms,
                    GalleryTimer::CopyFeedbackReset(ticket),
                ));
                true
            }
            Err(err) => {
                self.copy_failed(index, &err, host);
                false
            }
        }
    }

    /// Reverts the "copied" confirmation for `ticket`.
    pub(crate) fn feedback_expired<H: GalleryHost>(&mut self, ticket: CopyTicket, host: &mut H) {
        if let LightboxState::Open { index, copy } = self.state {
            if copy == CopyState::Copied(ticket) {
                self.reset_timer = None;
                self.set_copy(index, CopyState::Ready);
                host.set_copy_feedback(CopyFeedback::Ready);
            }
        }
    }

    fn copy_failed<H: GalleryHost>(&mut self, index: usize, err: &HostError, host: &mut H) {
        tracing::warn!(index, error = %err, "copy to clipboard failed");
        self.set_copy(index, CopyState::Ready);
        host.set_copy_feedback(CopyFeedback::Ready);
        host.notify("Could not copy the image. Please try again.");
    }

    fn set_copy(&mut self, index: usize, copy: CopyState) {
        self.state = LightboxState::Open { index, copy };
    }

    fn cancel_reset(&mut self, timers: &mut TimerQueue<GalleryTimer>) {
        if let Some(timer) = self.reset_timer.take() {
            timers.cancel(timer);
        }
    }
}

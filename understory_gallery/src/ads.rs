// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use understory_timing::{TimerId, TimerQueue};

use crate::controller::GalleryTimer;
use crate::host::GalleryHost;

/// Coarse viewport class used to pick ad formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewportClass {
    /// Narrower than the mobile breakpoint.
    Mobile,
    /// Everything else.
    Desktop,
}

impl ViewportClass {
    /// Classifies a viewport `width` against `breakpoint`.
    #[must_use]
    pub fn for_width(width: f64, breakpoint: f64) -> Self {
        if width < breakpoint {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }
}

/// Banner refresh policy: on start, on every viewport class change, and on a
/// fixed interval.
#[derive(Clone, Debug)]
pub struct BannerSchedule {
    breakpoint: f64,
    interval_ms: f64,
    class: Option<ViewportClass>,
    timer: Option<TimerId>,
}

impl BannerSchedule {
    /// Creates a stopped schedule. A non-positive or non-finite interval
    /// disables periodic refreshes.
    #[must_use]
    pub fn new(breakpoint: f64, interval_ms: f64) -> Self {
        Self {
            breakpoint,
            interval_ms,
            class: None,
            timer: None,
        }
    }

    /// Current viewport class, once started.
    #[must_use]
    pub fn class(&self) -> Option<ViewportClass> {
        self.class
    }

    pub(crate) fn start<H: GalleryHost>(
        &mut self,
        width: f64,
        now_ms: f64,
        host: &mut H,
        timers: &mut TimerQueue<GalleryTimer>,
    ) {
        let class = ViewportClass::for_width(width, self.breakpoint);
        self.class = Some(class);
        self.refresh(class, now_ms, host, timers);
    }

    /// Refreshes only when the class changed.
    pub(crate) fn resize<H: GalleryHost>(
        &mut self,
        width: f64,
        now_ms: f64,
        host: &mut H,
        timers: &mut TimerQueue<GalleryTimer>,
    ) {
        let class = ViewportClass::for_width(width, self.breakpoint);
        if self.class == Some(class) {
            return;
        }
        tracing::debug!(?class, "viewport class changed");
        self.class = Some(class);
        self.refresh(class, now_ms, host, timers);
    }

    pub(crate) fn fire<H: GalleryHost>(
        &mut self,
        id: TimerId,
        now_ms: f64,
        host: &mut H,
        timers: &mut TimerQueue<GalleryTimer>,
    ) {
        if self.timer != Some(id) {
            return;
        }
        self.timer = None;
        if let Some(class) = self.class {
            self.refresh(class, now_ms, host, timers);
        }
    }

    fn refresh<H: GalleryHost>(
        &mut self,
        class: ViewportClass,
        now_ms: f64,
        host: &mut H,
        timers: &mut TimerQueue<GalleryTimer>,
    ) {
        host.refresh_banner(class);
        if let Some(timer) = self.timer.take() {
            timers.cancel(timer);
        }
        if self.interval_ms.is_finite() && self.interval_ms > 0.0 {
            self.timer = Some(timers.schedule_after(
                now_ms,
                self.interval_ms,
                GalleryTimer::BannerRefresh,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ViewportClass;

    #[test]
    fn classifies_against_breakpoint() {
        assert_eq!(ViewportClass::for_width(767.0, 768.0), ViewportClass::Mobile);
        assert_eq!(ViewportClass::for_width(768.0, 768.0), ViewportClass::Desktop);
        assert_eq!(ViewportClass::for_width(1920.0, 768.0), ViewportClass::Desktop);
    }
}

// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Horizontal scrolling of single-line text that is wider than its view.
//!
//! The animator is a plain state machine. It never runs on its own: the host
//! calls [`MarqueeAnimator::tick`] once per frame and re-arms the next frame
//! as the returned [`FrameRequest`] asks.

use core::time::Duration;

use tracing::{debug, trace};

use crate::config::RepeatLimit;

/// Scroll speed at a density of one.
pub const PIXELS_PER_SECOND: f32 = 30.0;

/// Pause at the end of a scroll before the next one starts.
pub const RESTART_DELAY: Duration = Duration::from_millis(1200);

/// Longest time step a single tick advances by, so a stalled host does not
/// make the text jump.
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(100);

/// Lifecycle of a marquee.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MarqueeStatus {
    /// Not animating. The text is drawn unscrolled.
    #[default]
    Stopped,
    /// Waiting for the first frame to capture the start time.
    Starting,
    /// Scrolling, or pausing before a restart.
    Running,
}

/// When the host should call `tick` next.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FrameRequest {
    /// No further ticks are needed.
    #[default]
    None,
    /// Tick again before the next frame is drawn.
    NextFrame,
    /// Tick again once the duration has passed.
    After(Duration),
}

impl FrameRequest {
    /// The more urgent of two requests.
    #[must_use]
    pub fn earliest(self, other: Self) -> Self {
        match (self, other) {
            (Self::None, request) | (request, Self::None) => request,
            (Self::NextFrame, _) | (_, Self::NextFrame) => Self::NextFrame,
            (Self::After(a), Self::After(b)) => Self::After(a.min(b)),
        }
    }
}

/// Result of a tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Something visible changed.
    pub redraw: bool,
    /// When to tick again.
    pub next: FrameRequest,
}

impl TickOutcome {
    /// Combine two outcomes of the same frame.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            redraw: self.redraw || other.redraw,
            next: self.next.earliest(other.next),
        }
    }
}

/// The host side of frame scheduling.
///
/// Attached to an engine for as long as its view is alive; the engine asks
/// it for ticks and cancels them when it is detached.
pub trait FrameScheduler {
    /// Arrange for the engine to be ticked as requested.
    fn schedule(&mut self, request: FrameRequest);

    /// Drop any outstanding tick.
    fn cancel(&mut self) {}
}

/// Scroll state of a marquee.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarqueeAnimator {
    status: MarqueeStatus,
    scroll: f32,
    max_scroll: f32,
    ghost_start: f32,
    ghost_offset: f32,
    fade_stop: f32,
    max_fade_scroll: f32,
    pixels_per_second: f32,
    /// `None` repeats forever.
    repeats_remaining: Option<u32>,
    last_tick: Option<Duration>,
    restart_at: Option<Duration>,
}

impl MarqueeAnimator {
    /// A stopped animator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start scrolling a line `line_width` wide in a view `view_width` wide.
    ///
    /// Returns `false`, leaving the animator stopped, if the line fits or no
    /// repeats are allowed.
    pub fn start(
        &mut self,
        line_width: f32,
        view_width: f32,
        limit: RepeatLimit,
        density: f32,
    ) -> bool {
        let repeats = match limit {
            RepeatLimit::Forever => None,
            RepeatLimit::Times(times) => Some(times),
        };
        let overflows = line_width > view_width;
        if repeats == Some(0) || !overflows || view_width <= 0.0 {
            self.stop();
            return false;
        }
        let gap = view_width / 3.0;
        self.ghost_start = line_width - view_width + gap;
        self.max_scroll = self.ghost_start + view_width;
        self.ghost_offset = line_width + gap;
        self.fade_stop = line_width + view_width / 6.0;
        self.max_fade_scroll = self.ghost_start + 2.0 * line_width;
        self.pixels_per_second = PIXELS_PER_SECOND * density;
        self.repeats_remaining = repeats;
        self.scroll = 0.0;
        self.last_tick = None;
        self.restart_at = None;
        self.status = MarqueeStatus::Starting;
        debug!(line_width, view_width, ?limit, "starting marquee");
        true
    }

    /// Stop immediately and reset the scroll position.
    pub fn stop(&mut self) {
        if self.status != MarqueeStatus::Stopped {
            debug!("stopping marquee");
        }
        self.status = MarqueeStatus::Stopped;
        self.scroll = 0.0;
        self.last_tick = None;
        self.restart_at = None;
    }

    /// Advance the animation to `now`.
    pub fn tick(&mut self, now: Duration) -> TickOutcome {
        match self.status {
            MarqueeStatus::Stopped => TickOutcome::default(),
            MarqueeStatus::Starting => {
                self.status = MarqueeStatus::Running;
                self.last_tick = Some(now);
                TickOutcome {
                    redraw: false,
                    next: FrameRequest::NextFrame,
                }
            }
            MarqueeStatus::Running => match self.restart_at {
                Some(at) if now < at => TickOutcome {
                    redraw: false,
                    next: FrameRequest::After(at - now),
                },
                Some(_) => self.restart(now),
                None => self.advance(now),
            },
        }
    }

    fn advance(&mut self, now: Duration) -> TickOutcome {
        let last = self.last_tick.unwrap_or(now);
        let delta = now.saturating_sub(last).min(MAX_FRAME_DELTA);
        self.last_tick = Some(now);
        self.scroll += self.pixels_per_second * delta.as_secs_f32();
        trace!(scroll = self.scroll, "marquee tick");
        if self.scroll >= self.max_scroll {
            self.scroll = self.max_scroll;
            self.restart_at = Some(now + RESTART_DELAY);
            return TickOutcome {
                redraw: true,
                next: FrameRequest::After(RESTART_DELAY),
            };
        }
        TickOutcome {
            redraw: true,
            next: FrameRequest::NextFrame,
        }
    }

    fn restart(&mut self, now: Duration) -> TickOutcome {
        if let Some(remaining) = self.repeats_remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        if self.repeats_remaining == Some(0) {
            self.stop();
            return TickOutcome {
                redraw: true,
                next: FrameRequest::None,
            };
        }
        self.scroll = 0.0;
        self.restart_at = None;
        self.last_tick = Some(now);
        TickOutcome {
            redraw: true,
            next: FrameRequest::NextFrame,
        }
    }

    /// The current status.
    pub fn status(&self) -> MarqueeStatus {
        self.status
    }

    /// Returns `true` while scrolling or pausing between scrolls.
    pub fn is_running(&self) -> bool {
        self.status == MarqueeStatus::Running
    }

    /// Returns `true` if not animating.
    pub fn is_stopped(&self) -> bool {
        self.status == MarqueeStatus::Stopped
    }

    /// How far the text is scrolled to the left.
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    /// The scroll position at which a cycle ends.
    pub fn max_scroll(&self) -> f32 {
        self.max_scroll
    }

    /// Scroll position after which the ghost copy becomes visible.
    pub fn ghost_start(&self) -> f32 {
        self.ghost_start
    }

    /// Horizontal position of the ghost copy relative to the text.
    pub fn ghost_offset(&self) -> f32 {
        self.ghost_offset
    }

    /// Scroll position after which the left edge no longer fades.
    pub fn fade_stop(&self) -> f32 {
        self.fade_stop
    }

    /// Scroll distance over which the fading edges are faded out.
    pub fn max_fade_scroll(&self) -> f32 {
        self.max_fade_scroll
    }

    /// Remaining scroll cycles, `None` when repeating forever.
    pub fn repeats_remaining(&self) -> Option<u32> {
        self.repeats_remaining
    }

    /// Returns `true` if the ghost copy should be drawn.
    pub fn should_draw_ghost(&self) -> bool {
        self.is_running() && self.scroll > self.ghost_start
    }

    /// Returns `true` if the left edge should fade.
    pub fn should_draw_left_fade(&self) -> bool {
        self.scroll <= self.fade_stop
    }
}

// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::time::Duration;

/// Time between cursor visibility toggles.
pub const BLINK_PERIOD: Duration = Duration::from_millis(500);

/// Whether the cursor is currently painted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BlinkState {
    /// Painted.
    Visible,
    /// Not painted.
    Hidden,
}

/// Cursor blink timing.
///
/// The cursor only blinks while focused with a collapsed selection. It stays
/// visible while a drag is in progress, and every selection change restarts
/// the cycle with the cursor shown.
#[derive(Clone, Debug, Default)]
pub struct CursorBlink {
    focused: bool,
    dragging: bool,
    collapsed: bool,
    /// Start of the current cycle, `None` until the next tick after a restart.
    epoch: Option<Duration>,
}

impl CursorBlink {
    /// A blink that is not focused.
    pub fn new() -> Self {
        Self {
            collapsed: true,
            ..Default::default()
        }
    }

    /// Gain or lose focus.
    pub fn set_focused(&mut self, focused: bool) {
        if focused != self.focused {
            self.focused = focused;
            self.restart();
        }
    }

    /// Start or end a drag.
    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    /// Tell the blink whether the selection is a cursor.
    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
    }

    /// Start a new cycle with the cursor shown.
    pub fn restart(&mut self) {
        self.epoch = None;
    }

    /// Returns `true` if the state alternates over time.
    pub fn is_blinking(&self) -> bool {
        self.focused && self.collapsed && !self.dragging
    }

    /// Advance the clock.
    pub fn tick(&mut self, now: Duration) {
        if self.epoch.is_none() {
            self.epoch = Some(now);
        }
    }

    /// The state at time `now`.
    pub fn state(&self, now: Duration) -> BlinkState {
        if !self.focused || !self.collapsed {
            return BlinkState::Hidden;
        }
        if self.dragging {
            return BlinkState::Visible;
        }
        let Some(epoch) = self.epoch else {
            return BlinkState::Visible;
        };
        let phase = now.saturating_sub(epoch).as_millis() / BLINK_PERIOD.as_millis();
        if phase % 2 == 0 {
            BlinkState::Visible
        } else {
            BlinkState::Hidden
        }
    }

    /// Time until the state next changes, if it is blinking.
    pub fn until_toggle(&self, now: Duration) -> Option<Duration> {
        if !self.is_blinking() {
            return None;
        }
        let Some(epoch) = self.epoch else {
            return Some(BLINK_PERIOD);
        };
        let period = BLINK_PERIOD.as_millis();
        let elapsed = now.saturating_sub(epoch).as_millis();
        let remaining = period - elapsed % period;
        Some(Duration::from_millis(u64::try_from(remaining).unwrap_or(0)))
    }
}

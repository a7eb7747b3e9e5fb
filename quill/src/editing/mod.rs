// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selection state and the geometry of cursor and selection highlights.

mod blink;
mod highlight;
mod selection;
mod tracker;

pub(crate) use self::highlight::for_each_range_rect;

pub use self::blink::{BlinkState, CursorBlink, BLINK_PERIOD};
pub use self::highlight::{
    cursor_geometry, invalidation_rect, selection_geometry, HighlightGeometry, HighlightKind,
};
pub use self::selection::Selection;
pub use self::tracker::SelectionTracker;

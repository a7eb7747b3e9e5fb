// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use serde::{Deserialize, Serialize};
use spanned_text::{Edit, Gravity};

/// A selected byte range, or a cursor when collapsed.
///
/// The anchor is where the selection started, the focus where it currently
/// ends; the focus may come before the anchor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    anchor: usize,
    focus: usize,
}

impl Selection {
    /// Creates a selection from `anchor` to `focus`.
    pub fn new(anchor: usize, focus: usize) -> Self {
        Self { anchor, focus }
    }

    /// Creates a cursor at `offset`.
    pub fn collapsed(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Returns true if the anchor and focus are the same position.
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Where the selection started.
    pub fn anchor(&self) -> usize {
        self.anchor
    }

    /// Where the selection currently ends.
    pub fn focus(&self) -> usize {
        self.focus
    }

    /// The smaller of anchor and focus.
    pub fn start(&self) -> usize {
        self.anchor.min(self.focus)
    }

    /// The larger of anchor and focus.
    pub fn end(&self) -> usize {
        self.anchor.max(self.focus)
    }

    /// Returns the selected byte range.
    pub fn text_range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// Returns a selection with the same anchor and a new focus.
    #[must_use]
    pub fn with_focus(&self, focus: usize) -> Self {
        Self::new(self.anchor, focus)
    }

    /// Moves both ends across `edit`. Ends inside replaced text land after
    /// the inserted text.
    #[must_use]
    pub fn map_edit(&self, edit: &Edit) -> Self {
        Self::new(
            edit.map_offset(self.anchor, Gravity::After),
            edit.map_offset(self.focus, Gravity::After),
        )
    }
}

// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

/// A single replacement applied to a buffer.
///
/// `removed` bytes starting at `start` were replaced with `inserted` bytes.
/// Pure insertions have `removed == 0`, pure deletions have `inserted == 0`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Edit {
    /// Byte offset of the first affected byte.
    pub start: usize,
    /// Number of bytes removed from the old text.
    pub removed: usize,
    /// Number of bytes inserted into the new text.
    pub inserted: usize,
}

/// Which side of an insertion an offset sticks to.
///
/// An offset that sits exactly where text is inserted (or inside text that is
/// deleted) must end up on one side of the new text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Gravity {
    /// The offset stays before the inserted text.
    Before,
    /// The offset moves past the inserted text.
    #[default]
    After,
}

impl Edit {
    /// Creates an edit replacing `range` with `inserted` bytes.
    pub fn new(range: Range<usize>, inserted: usize) -> Self {
        Self {
            start: range.start,
            removed: range.end - range.start,
            inserted,
        }
    }

    /// End of the replaced range in the old text.
    pub fn old_end(&self) -> usize {
        self.start + self.removed
    }

    /// End of the inserted range in the new text.
    pub fn new_end(&self) -> usize {
        self.start + self.inserted
    }

    /// The range that was replaced, in old text coordinates.
    pub fn old_range(&self) -> Range<usize> {
        self.start..self.old_end()
    }

    /// The range of inserted text, in new text coordinates.
    pub fn new_range(&self) -> Range<usize> {
        self.start..self.new_end()
    }

    /// Signed length change of the text.
    pub fn delta(&self) -> isize {
        self.inserted as isize - self.removed as isize
    }

    /// Returns `true` if the edit changed nothing.
    pub fn is_noop(&self) -> bool {
        self.removed == 0 && self.inserted == 0
    }

    /// Maps an offset in the old text to the new text.
    ///
    /// Offsets before the edit are unchanged and offsets after it shift by
    /// [`delta`](Self::delta). An offset at the start of a non-empty replaced
    /// range stays put, one at its end follows the text after the edit, and
    /// offsets strictly inside the replaced range or exactly at an insertion
    /// point are resolved by `gravity`.
    pub fn map_offset(&self, offset: usize, gravity: Gravity) -> usize {
        let old_end = self.old_end();
        if offset < self.start {
            offset
        } else if offset > old_end {
            offset - self.removed + self.inserted
        } else if self.removed != 0 && offset == self.start {
            self.start
        } else if self.removed != 0 && offset == old_end {
            self.new_end()
        } else {
            match gravity {
                Gravity::Before => self.start,
                Gravity::After => self.new_end(),
            }
        }
    }

    /// Combines this edit with a `next` edit applied to its result.
    ///
    /// The returned edit covers every byte touched by either edit: applying it
    /// to the text before `self` describes the same change as applying both.
    /// Text outside the combined range is identical before and after.
    #[must_use]
    pub fn merge(self, next: Self) -> Self {
        let start = self.start.min(next.start);
        let new_end = next
            .new_end()
            .max(next.map_offset(self.new_end(), Gravity::After));
        let delta = self.delta() + next.delta();
        let old_end = (new_end as isize - delta).max(start as isize) as usize;
        Self {
            start,
            removed: old_end - start,
            inserted: new_end - start,
        }
    }
}

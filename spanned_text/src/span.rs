// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use crate::{Edit, Gravity};

/// Stable handle to a span in a [`SpannedBuffer`](crate::SpannedBuffer).
///
/// Handles are generational: once a span is removed, its handle never
/// resolves again even if the slot is reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpanId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// How the ends of a span react to text inserted right at them.
///
/// An inclusive start grows the span when text is inserted at its start, an
/// inclusive end grows it when text is inserted at its end.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SpanFlags {
    /// Whether text inserted at the start becomes part of the span.
    pub start_inclusive: bool,
    /// Whether text inserted at the end becomes part of the span.
    pub end_inclusive: bool,
}

impl SpanFlags {
    /// Neither end grows. Empty spans with these flags are dropped.
    pub const EXCLUSIVE_EXCLUSIVE: Self = Self {
        start_inclusive: false,
        end_inclusive: false,
    };
    /// Only the end grows; typical for character styles being typed.
    pub const EXCLUSIVE_INCLUSIVE: Self = Self {
        start_inclusive: false,
        end_inclusive: true,
    };
    /// Only the start grows.
    pub const INCLUSIVE_EXCLUSIVE: Self = Self {
        start_inclusive: true,
        end_inclusive: false,
    };
    /// Both ends grow.
    pub const INCLUSIVE_INCLUSIVE: Self = Self {
        start_inclusive: true,
        end_inclusive: true,
    };

    pub(crate) fn start_gravity(self) -> Gravity {
        if self.start_inclusive {
            Gravity::Before
        } else {
            Gravity::After
        }
    }

    pub(crate) fn end_gravity(self) -> Gravity {
        if self.end_inclusive {
            Gravity::After
        } else {
            Gravity::Before
        }
    }
}

/// A range-tagged attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct Span<A> {
    pub(crate) range: Range<usize>,
    pub(crate) attribute: A,
    pub(crate) priority: i32,
    pub(crate) flags: SpanFlags,
    pub(crate) order: u64,
}

impl<A> Span<A> {
    /// The byte range the span currently covers.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// The attached attribute.
    pub fn attribute(&self) -> &A {
        &self.attribute
    }

    /// Spans with a higher priority are reported first.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// The edit behaviour of the span ends.
    pub fn flags(&self) -> SpanFlags {
        self.flags
    }

    /// Moves the span boundaries across `edit`.
    ///
    /// Returns `false` if the span collapsed and should be dropped.
    pub(crate) fn apply_edit(&mut self, edit: &Edit) -> bool {
        let was_empty = self.range.is_empty();
        let start = edit.map_offset(self.range.start, self.flags.start_gravity());
        let end = edit
            .map_offset(self.range.end, self.flags.end_gravity())
            .max(start);
        self.range = start..end;
        !(self.range.is_empty() && !was_empty && self.flags == SpanFlags::EXCLUSIVE_EXCLUSIVE)
    }
}

#[cfg(test)]
mod tests {
    use super::{Span, SpanFlags};
    use crate::Edit;

    fn span(range: core::ops::Range<usize>, flags: SpanFlags) -> Span<()> {
        Span {
            range,
            attribute: (),
            priority: 0,
            flags,
            order: 0,
        }
    }

    #[test]
    fn insertion_at_boundaries_respects_flags() {
        let mut exclusive = span(5..10, SpanFlags::EXCLUSIVE_EXCLUSIVE);
        assert!(exclusive.apply_edit(&Edit::new(5..5, 2)));
        assert_eq!(exclusive.range(), 7..12);
        assert!(exclusive.apply_edit(&Edit::new(12..12, 2)));
        assert_eq!(exclusive.range(), 7..12);

        let mut inclusive = span(5..10, SpanFlags::INCLUSIVE_INCLUSIVE);
        assert!(inclusive.apply_edit(&Edit::new(5..5, 2)));
        assert_eq!(inclusive.range(), 5..12);
        assert!(inclusive.apply_edit(&Edit::new(12..12, 2)));
        assert_eq!(inclusive.range(), 5..14);
    }

    #[test]
    fn straddling_deletion_moves_one_boundary() {
        let mut s = span(2..8, SpanFlags::EXCLUSIVE_INCLUSIVE);
        assert!(s.apply_edit(&Edit::new(6..10, 0)));
        assert_eq!(s.range(), 2..6);

        let mut s = span(4..8, SpanFlags::EXCLUSIVE_INCLUSIVE);
        assert!(s.apply_edit(&Edit::new(0..6, 0)));
        assert_eq!(s.range(), 0..2);
    }

    #[test]
    fn covered_exclusive_span_is_dropped() {
        let mut s = span(2..4, SpanFlags::EXCLUSIVE_EXCLUSIVE);
        assert!(!s.apply_edit(&Edit::new(1..5, 0)));

        let mut s = span(2..4, SpanFlags::INCLUSIVE_INCLUSIVE);
        assert!(s.apply_edit(&Edit::new(1..5, 0)));
        assert_eq!(s.range(), 1..1);
    }
}

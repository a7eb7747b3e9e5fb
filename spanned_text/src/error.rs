// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::SpanId;

/// Error type for spanned text operations.
///
/// Every variant carries the caller-provided range and the length of the text at
/// the time of failure, so callers can log a useful message without holding on
/// to the buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The provided range had `start > end`.
    #[error("invalid range {start}..{end}: start > end")]
    InvalidRange {
        /// The start byte index of the caller-provided range.
        start: usize,
        /// The end byte index of the caller-provided range.
        end: usize,
        /// The length in bytes of the text.
        len: usize,
    },

    /// Provided range indices were out of bounds relative to the text length.
    #[error("range {start}..{end} out of bounds for len {len}")]
    InvalidBounds {
        /// The start byte index of the caller-provided range.
        start: usize,
        /// The end byte index of the caller-provided range.
        end: usize,
        /// The length in bytes of the text.
        len: usize,
    },

    /// Either `start` or `end` was not aligned to a UTF-8 character boundary.
    #[error("range {start}..{end}: index {index} not on UTF-8 boundary (char {char_start}..{char_end})")]
    NotOnCharBoundary {
        /// The start byte index of the caller-provided range.
        start: usize,
        /// The end byte index of the caller-provided range.
        end: usize,
        /// The offending byte index.
        index: usize,
        /// The start byte index of the enclosing codepoint.
        char_start: usize,
        /// The end byte index (exclusive) of the enclosing codepoint.
        char_end: usize,
    },

    /// The span handle does not refer to a live span.
    #[error("span {0:?} is not attached to this buffer")]
    UnknownSpan(SpanId),
}

impl Error {
    /// Returns `true` for errors caused by an offset that is outside of the text
    /// or in the middle of a character.
    pub fn is_range_error(&self) -> bool {
        !matches!(self, Self::UnknownSpan(_))
    }

    pub(crate) fn not_on_char_boundary(text: &str, start: usize, end: usize, index: usize) -> Self {
        let (char_start, char_end) = enclosing_char_span(text, index);
        Self::NotOnCharBoundary {
            start,
            end,
            index,
            char_start,
            char_end,
        }
    }
}

fn enclosing_char_span(text: &str, index: usize) -> (usize, usize) {
    if index > text.len() || text.is_char_boundary(index) {
        return (index, index);
    }
    // A UTF-8 sequence is at most four bytes long, so both searches terminate
    // within three steps.
    let start = (0..index)
        .rev()
        .find(|i| text.is_char_boundary(*i))
        .unwrap_or(0);
    let end = (index + 1..=text.len())
        .find(|i| text.is_char_boundary(*i))
        .unwrap_or(text.len());
    (start, end)
}

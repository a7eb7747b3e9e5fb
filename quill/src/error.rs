// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::config::Truncation;

/// A [`TextConfig`](crate::TextConfig) that cannot be laid out.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A line limit of zero would hide all text.
    #[error("max_lines must be at least 1")]
    ZeroMaxLines,
    /// The minimum line count is larger than the maximum.
    #[error("min_lines ({min}) exceeds max_lines ({max})")]
    MinExceedsMax {
        /// Requested minimum.
        min: usize,
        /// Requested maximum.
        max: usize,
    },
    /// The line spacing multiplier is not a positive finite number.
    #[error("line spacing multiplier {0} must be finite and positive")]
    InvalidSpacingMultiplier(f32),
    /// The extra line spacing is not finite.
    #[error("line spacing extra {0} must be finite")]
    InvalidSpacingExtra(f32),
    /// Start, middle and marquee truncation only work on a single line.
    #[error("{mode:?} truncation requires a single visible line")]
    TruncationNeedsSingleLine {
        /// The offending mode.
        mode: Truncation,
    },
    /// The display density is not a positive finite number.
    #[error("density {0} must be finite and positive")]
    InvalidDensity(f32),
    /// The cursor width is not a positive finite number.
    #[error("cursor width {0} must be finite and positive")]
    InvalidCursorWidth(f32),
}

/// Errors reported by the [`TextEngine`](crate::TextEngine).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// A range or offset outside of the current text.
    #[error("range {start}..{end} is outside the text (len {len})")]
    InvalidRange {
        /// Requested start.
        start: usize,
        /// Requested end.
        end: usize,
        /// Length of the text.
        len: usize,
    },
    /// The text buffer rejected an edit.
    #[error(transparent)]
    Buffer(#[from] spanned_text::Error),
    /// The measurer returned a value that is not a finite number.
    #[error("measurement returned a non-finite value ({0})")]
    DegenerateMeasurement(f32),
    /// A batch edit was closed more often than it was opened.
    #[error("end_batch_edit called without a matching begin_batch_edit")]
    ReentrantBatchImbalance,
    /// Highlight geometry was requested while no current layout exists.
    #[error("highlight geometry requested before a layout was built")]
    StaleGeometryAccess,
}

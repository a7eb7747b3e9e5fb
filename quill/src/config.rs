// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How paragraphs are broken into lines.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BreakStrategy {
    /// Greedy: fill each line as far as it goes.
    Simple,
    /// Minimise the raggedness of all lines but the last.
    #[default]
    HighQuality,
    /// Make all lines, including the last, about the same width.
    Balanced,
}

/// What happens to text that doesn't fit the visible lines.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Truncation {
    /// Overflowing text is clipped.
    #[default]
    None,
    /// Replace the start of the line with an ellipsis.
    Start,
    /// Replace the middle of the line with an ellipsis.
    Middle,
    /// Replace the end of the last visible line with an ellipsis.
    End,
    /// Scroll the single line horizontally.
    Marquee,
}

impl Truncation {
    /// Returns `true` for the modes that insert an ellipsis.
    pub fn is_ellipsis(self) -> bool {
        matches!(self, Self::Start | Self::Middle | Self::End)
    }
}

/// Alignment of lines within the available width.
///
/// `Start` and `End` follow the direction of the paragraph, `Left` and
/// `Right` do not.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    /// Align to the start of the paragraph direction.
    #[default]
    Start,
    /// Align to the end of the paragraph direction.
    End,
    /// Align to the left edge.
    Left,
    /// Center lines.
    Center,
    /// Align to the right edge.
    Right,
}

/// How many times a marquee scrolls before it stops.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepeatLimit {
    /// Never stop while the marquee conditions hold.
    Forever,
    /// Stop after this many passes. Zero never starts.
    Times(u32),
}

impl Default for RepeatLimit {
    fn default() -> Self {
        Self::Times(3)
    }
}

/// Layout and behaviour options of a [`TextEngine`](crate::TextEngine).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Maximum number of visible lines, `None` for no limit.
    pub max_lines: Option<usize>,
    /// Minimum number of lines the measured height accounts for.
    pub min_lines: Option<usize>,
    /// Keep all text on one line; newlines are shown as spaces.
    pub single_line: bool,
    /// Line breaking strategy.
    pub break_strategy: BreakStrategy,
    /// Truncation of overflowing text.
    pub truncation: Truncation,
    /// Use the font's top and bottom instead of ascent and descent for the
    /// first and last line.
    pub include_font_padding: bool,
    /// Factor applied to the natural line height.
    pub line_spacing_multiplier: f32,
    /// Extra space added between lines.
    pub line_spacing_extra: f32,
    /// Horizontal alignment.
    pub alignment: Alignment,
    /// Insert a hyphen when a word has to be broken.
    pub hyphenation: bool,
    /// Marquee repetitions.
    pub marquee_repeat_limit: RepeatLimit,
    /// Width of the cursor stroke.
    pub cursor_width: f32,
    /// Device pixels per unit, scales the marquee speed.
    pub density: f32,
    /// Save the text itself in [`SavedState`](crate::SavedState) even when
    /// the engine isn't editable.
    pub freezes_text: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            max_lines: None,
            min_lines: None,
            single_line: false,
            break_strategy: BreakStrategy::default(),
            truncation: Truncation::default(),
            include_font_padding: true,
            line_spacing_multiplier: 1.0,
            line_spacing_extra: 0.0,
            alignment: Alignment::default(),
            hyphenation: false,
            marquee_repeat_limit: RepeatLimit::default(),
            cursor_width: 1.0,
            density: 1.0,
            freezes_text: false,
        }
    }
}

impl TextConfig {
    /// A single line configuration with the given truncation.
    pub fn single_line(truncation: Truncation) -> Self {
        Self {
            single_line: true,
            truncation,
            ..Default::default()
        }
    }

    /// Set the maximum number of visible lines.
    #[must_use]
    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = Some(max_lines);
        self
    }

    /// Set the minimum number of lines.
    #[must_use]
    pub fn with_min_lines(mut self, min_lines: usize) -> Self {
        self.min_lines = Some(min_lines);
        self
    }

    /// Set the truncation mode.
    #[must_use]
    pub fn with_truncation(mut self, truncation: Truncation) -> Self {
        self.truncation = truncation;
        self
    }

    /// Set the break strategy.
    #[must_use]
    pub fn with_break_strategy(mut self, break_strategy: BreakStrategy) -> Self {
        self.break_strategy = break_strategy;
        self
    }

    /// Set the alignment.
    #[must_use]
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set the line spacing.
    #[must_use]
    pub fn with_line_spacing(mut self, multiplier: f32, extra: f32) -> Self {
        self.line_spacing_multiplier = multiplier;
        self.line_spacing_extra = extra;
        self
    }

    /// The number of lines that can be shown, if limited.
    pub fn visible_line_limit(&self) -> Option<usize> {
        if self.single_line {
            Some(1)
        } else {
            self.max_lines
        }
    }

    /// Check for conflicting or degenerate options.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_lines == Some(0) {
            return Err(ConfigError::ZeroMaxLines);
        }
        if let (Some(min), Some(max)) = (self.min_lines, self.max_lines) {
            if min > max {
                return Err(ConfigError::MinExceedsMax { min, max });
            }
        }
        if !self.line_spacing_multiplier.is_finite() || self.line_spacing_multiplier <= 0.0 {
            return Err(ConfigError::InvalidSpacingMultiplier(
                self.line_spacing_multiplier,
            ));
        }
        if !self.line_spacing_extra.is_finite() {
            return Err(ConfigError::InvalidSpacingExtra(self.line_spacing_extra));
        }
        match self.truncation {
            Truncation::Start | Truncation::Middle | Truncation::Marquee
                if self.visible_line_limit() != Some(1) =>
            {
                return Err(ConfigError::TruncationNeedsSingleLine {
                    mode: self.truncation,
                });
            }
            _ => {}
        }
        if !self.density.is_finite() || self.density <= 0.0 {
            return Err(ConfigError::InvalidDensity(self.density));
        }
        if !self.cursor_width.is_finite() || self.cursor_width <= 0.0 {
            return Err(ConfigError::InvalidCursorWidth(self.cursor_width));
        }
        Ok(())
    }
}

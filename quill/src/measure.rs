// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use tracing::warn;

use crate::error::EngineError;

/// Vertical metrics of the font used for layout.
///
/// All values are distances from the baseline and positive in their natural
/// direction: `ascent` and `top` grow upwards, `descent` and `bottom`
/// downwards.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FontMetrics {
    /// Recommended distance above the baseline.
    pub ascent: f32,
    /// Recommended distance below the baseline.
    pub descent: f32,
    /// Highest extent of any glyph above the baseline.
    pub top: f32,
    /// Lowest extent of any glyph below the baseline.
    pub bottom: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            ascent: 8.0,
            descent: 2.0,
            top: 10.0,
            bottom: 3.0,
        }
    }
}

impl FontMetrics {
    /// Replace non-finite or negative values with zero.
    pub(crate) fn sanitized(self) -> Self {
        Self {
            ascent: sanitize(self.ascent, "ascent"),
            descent: sanitize(self.descent, "descent"),
            top: sanitize(self.top, "top"),
            bottom: sanitize(self.bottom, "bottom"),
        }
    }
}

/// Supplies measurements of text to the layout.
///
/// The layout never shapes glyphs itself. It asks for the advance of each
/// grapheme cluster and caches the answers, so the same cluster is measured
/// once per layout build.
pub trait Measure {
    /// The horizontal advance of `text`.
    fn advance(&self, text: &str) -> f32;

    /// The metrics of the font.
    fn font_metrics(&self) -> FontMetrics;
}

impl<M: Measure + ?Sized> Measure for &M {
    fn advance(&self, text: &str) -> f32 {
        (**self).advance(text)
    }

    fn font_metrics(&self) -> FontMetrics {
        (**self).font_metrics()
    }
}

/// A measurer giving every visible character the same advance.
///
/// Combining marks and control characters have no advance, so a grapheme
/// cluster like `e\u{301}` is as wide as `e`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Monospace {
    /// Advance of a single character.
    pub advance: f32,
    /// Font metrics reported for every line.
    pub metrics: FontMetrics,
}

impl Monospace {
    /// A monospace measurer with default font metrics.
    pub fn new(advance: f32) -> Self {
        Self {
            advance,
            metrics: FontMetrics::default(),
        }
    }

    /// Replace the font metrics.
    #[must_use]
    pub fn with_metrics(mut self, metrics: FontMetrics) -> Self {
        self.metrics = metrics;
        self
    }
}

fn is_zero_width(c: char) -> bool {
    c.is_control()
        || matches!(c, '\u{0300}'..='\u{036F}' | '\u{200B}'..='\u{200D}' | '\u{FE00}'..='\u{FE0F}')
}

impl Measure for Monospace {
    fn advance(&self, text: &str) -> f32 {
        let count = text.chars().filter(|c| !is_zero_width(*c)).count();
        count as f32 * self.advance
    }

    fn font_metrics(&self) -> FontMetrics {
        self.metrics
    }
}

/// Checks that a measured value is a finite number.
pub(crate) fn check(value: f32) -> Result<f32, EngineError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EngineError::DegenerateMeasurement(value))
    }
}

/// Non-finite and negative measurements are treated as zero.
pub(crate) fn sanitize(value: f32, what: &str) -> f32 {
    match check(value) {
        Ok(value) if value >= 0.0 => value,
        Ok(value) => {
            warn!(value, what, "negative measurement clamped to zero");
            0.0
        }
        Err(err) => {
            warn!(%err, what, "treating measurement as zero");
            0.0
        }
    }
}

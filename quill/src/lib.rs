// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quill is the text engine behind a rich, optionally editable text widget.
//!
//! It turns a [`SpannedBuffer`] into a [`Layout`] for a given width, keeps a
//! selection in sync with edits, renders cursor and selection geometry,
//! notifies [`TextWatcher`]s and input methods about changes, and scrolls
//! single-line overflowing text as a marquee.
//!
//! Glyph shaping is left to the host: text is measured through the
//! [`Measure`] trait, one grapheme cluster at a time.
//!
//! ```
//! use quill::{LayoutContext, MeasureSpec, Monospace, TextConfig, TextEngine};
//!
//! let mut engine = TextEngine::<u32>::new(TextConfig::default()).unwrap();
//! engine.set_text("Hello world");
//! engine.set_editable(true);
//!
//! let measure = Monospace::new(10.0);
//! let mut layout_cx = LayoutContext::new();
//! let mut driver = engine.driver(&measure, &mut layout_cx);
//! driver.insert_or_replace_selection("!").unwrap();
//! let size = driver.measure(MeasureSpec::AtMost(60.0), MeasureSpec::Unspecified);
//! assert_eq!(size.width, 60.0);
//! assert_eq!(engine.text(), "!Hello world");
//! ```
// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use peniko::kurbo::{BezPath, Point, Rect};
pub use spanned_text;
pub use spanned_text::{Edit, SpanFlags, SpanId, SpannedBuffer};

mod config;
mod draw;
mod engine;
mod error;
mod ime;
mod measure;
mod state;
mod style;

pub mod editing;
pub mod layout;
pub mod marquee;
pub mod notify;

#[cfg(test)]
mod tests;

pub use config::{Alignment, BreakStrategy, RepeatLimit, TextConfig, Truncation};
pub use draw::{DrawColors, Painter};
pub use engine::{Generation, Invalidation, MeasureSpec, Size, TextEngine, TextEngineDriver};
pub use error::{ConfigError, EngineError};
pub use ime::{ExtractedText, ExtractedTextRequest, InputConnection, InputMethodClient};
pub use layout::{Layout, LayoutContext, LayoutKind};
pub use marquee::{FrameRequest, FrameScheduler, MarqueeStatus, TickOutcome};
pub use measure::{FontMetrics, Measure, Monospace};
pub use notify::{ChangedRange, TextWatcher, WatcherContext, WatcherId};
pub use state::SavedState;
pub use style::{Brush, SpanStyle};

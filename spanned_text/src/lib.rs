// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spanned Text is a mutable UTF-8 buffer with range-tagged spans.
//!
//! Spans live in an arena and are addressed by generational [`SpanId`] handles,
//! so holders never depend on object identity. Every text edit is validated
//! before anything changes, reported to an [`EditObserver`] before and after it
//! is applied, and moves span boundaries according to their [`SpanFlags`].
//!
//! ```
//! use spanned_text::{SpanFlags, SpannedBuffer};
//!
//! let mut text = SpannedBuffer::new("Hello!");
//! let bold = text.add_span(0..5, "bold", SpanFlags::EXCLUSIVE_EXCLUSIVE, 0).unwrap();
//! text.insert(0, ">> ").unwrap();
//! assert_eq!(text.span_range(bold), Some(3..8));
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

mod buffer;
mod edit;
mod error;
mod span;
mod validate;

pub use crate::buffer::{EditObserver, SpannedBuffer};
pub use crate::edit::{Edit, Gravity};
pub use crate::error::Error;
pub use crate::span::{Span, SpanFlags, SpanId};

pub(crate) use crate::validate::validate_range;

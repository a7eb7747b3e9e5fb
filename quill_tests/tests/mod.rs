// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate contains the integration test suite for `quill`.
//!
//! - The `util` module contains shared utility functions that are needed by different
//!   test methods.
//! - We do not use the default Rust test harness, but instead use this `mod.rs` file as the
//!   entry point to run all other tests. This makes it easier to share utilities between
//!   topics.
//! - Tests only use the public API of `quill`. Tests that need crate internals live in
//!   `quill/src/tests`.
//! - For test naming, put the "topic" of the test at the start of the name, e.g.
//!   `editor_backspace_joins_lines` rather than `backspace_joins_lines_in_editor`.
//! - Set `RUST_LOG=quill=debug` to see what the engine is doing.

#![allow(missing_docs, reason = "we don't need docs for testing")]
#![allow(clippy::cast_possible_truncation, reason = "not critical for testing")]

mod ime;
#[macro_use]
mod util;

// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The connection between an engine and an input method.

use core::ops::Range;

use tracing::warn;

use crate::editing::Selection;
use crate::engine::TextEngine;
use crate::error::EngineError;
use crate::notify::ChangedRange;
use crate::style::Brush;

/// What an input method asks for when extracting text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractedTextRequest {
    /// Identifies the request in later updates.
    pub token: u32,
    /// Keep sending updates after every batch that changes the text.
    pub monitor: bool,
    /// The part of the text to extract. `None` extracts all of it.
    pub range: Option<Range<usize>>,
}

/// Text handed to an input method.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractedText {
    /// The extracted text.
    pub text: String,
    /// Offset of `text` in the engine's text.
    pub start_offset: usize,
    /// For partial updates, the range of the previously reported text that
    /// `text` replaces. `None` when `text` is the whole text.
    pub partial_range: Option<Range<usize>>,
    /// The selection, in the engine's text.
    pub selection: Selection,
    /// The text is a single line.
    pub single_line: bool,
}

/// The input method side of a connection.
///
/// It is only called when the outermost batch of edits closes, with the net
/// effect of the batch.
pub trait InputMethodClient {
    /// A monitored extraction changed.
    fn update_extracted_text(&mut self, token: u32, text: &ExtractedText);

    /// The selection or composing region may have moved.
    fn update_selection(&mut self, selection: Selection, composing: Option<Range<usize>>);

    /// The text changed.
    fn content_changed(&mut self, changed: ChangedRange) {
        let _ = changed;
    }

    /// The text was replaced wholesale; any input state is stale.
    fn restart_input(&mut self) {}
}

/// Operations an input method performs on a [`TextEngine`].
///
/// Every operation runs in its own batch, so the input method only hears
/// about its net effect once it is done.
#[derive(Debug)]
pub struct InputConnection<'a, B: Brush> {
    engine: &'a mut TextEngine<B>,
}

impl<'a, B: Brush> InputConnection<'a, B> {
    pub(crate) fn new(engine: &'a mut TextEngine<B>) -> Self {
        Self { engine }
    }

    /// Open a batch spanning several operations.
    pub fn begin_batch_edit(&mut self) {
        self.engine.begin_batch_edit();
    }

    /// Close a batch.
    pub fn end_batch_edit(&mut self) -> Result<(), EngineError> {
        self.engine.end_batch_edit()
    }

    /// The requested part of the text, registering `request` for updates if
    /// it is monitored.
    ///
    /// The range must lie on character boundaries inside the text. Updates to
    /// a monitored request always report the changed part of the text.
    pub fn extract_text(
        &mut self,
        request: ExtractedTextRequest,
    ) -> Result<ExtractedText, EngineError> {
        let buffer = self.engine.buffer();
        let len = buffer.len();
        let range = request.range.clone().unwrap_or(0..len);
        let fits = |offset| offset <= len && buffer.is_char_boundary(offset);
        if range.start > range.end || !fits(range.start) || !fits(range.end) {
            warn!(start = range.start, end = range.end, len, "extraction outside the text");
            return Err(EngineError::InvalidRange {
                start: range.start,
                end: range.end,
                len,
            });
        }
        self.engine.set_extract_request(request);
        let mut extracted = self.engine.extracted_text(None);
        if range != (0..len) {
            extracted.text = extracted.text[range.clone()].to_owned();
            extracted.start_offset = range.start;
        }
        Ok(extracted)
    }

    /// Up to `len` bytes before the selection, cut at a character boundary.
    pub fn text_before_cursor(&self, len: usize) -> &str {
        let text = self.engine.text();
        let end = self.engine.selection().start();
        let mut start = end.saturating_sub(len);
        while !text.is_char_boundary(start) {
            start += 1;
        }
        &text[start..end]
    }

    /// Up to `len` bytes after the selection, cut at a character boundary.
    pub fn text_after_cursor(&self, len: usize) -> &str {
        let start = self.engine.selection().end();
        let end = self.engine.buffer().clamp_offset(start.saturating_add(len));
        &self.engine.text()[start..end]
    }

    /// The selected text.
    pub fn selected_text(&self) -> &str {
        self.engine.selected_text()
    }

    /// Replace the composing region, or the selection when there is none,
    /// with `text`, and end composing.
    ///
    /// A positive `new_cursor_pos` places the cursor relative to the end of
    /// the inserted text, with 1 meaning right after it. Zero or negative
    /// values place it relative to the start.
    pub fn commit_text(&mut self, text: &str, new_cursor_pos: isize) -> Result<(), EngineError> {
        self.engine.begin_batch_edit();
        let result = self.replace_composing(text, new_cursor_pos, false);
        self.end();
        result
    }

    /// Replace the composing region, or the selection when there is none,
    /// with `text`, and mark it as the new composing region.
    pub fn set_composing_text(&mut self, text: &str, new_cursor_pos: isize) -> Result<(), EngineError> {
        self.engine.begin_batch_edit();
        let result = self.replace_composing(text, new_cursor_pos, true);
        self.end();
        result
    }

    fn replace_composing(
        &mut self,
        text: &str,
        new_cursor_pos: isize,
        compose: bool,
    ) -> Result<(), EngineError> {
        let range = self
            .engine
            .composing_range()
            .unwrap_or_else(|| self.engine.selection().text_range());
        let end = self.engine.apply_edit(range.clone(), text)?;
        let inserted = range.start..end.max(range.start);
        let composing = (compose && !inserted.is_empty()).then(|| inserted.clone());
        self.engine.set_composing(composing)?;
        let cursor = if new_cursor_pos > 0 {
            inserted.end as isize + new_cursor_pos - 1
        } else {
            inserted.start as isize + new_cursor_pos
        };
        let cursor = usize::try_from(cursor.max(0)).unwrap_or(0);
        let cursor = self.engine.buffer().clamp_offset(cursor);
        self.engine.update_selection(Selection::collapsed(cursor));
        Ok(())
    }

    /// Mark `start..end` as the composing region. An empty range ends
    /// composing.
    pub fn set_composing_region(&mut self, start: usize, end: usize) -> Result<(), EngineError> {
        let buffer = self.engine.buffer();
        let (start, end) = (start.min(end), start.max(end));
        let range = buffer.clamp_offset(start)..buffer.clamp_offset(end);
        self.engine.begin_batch_edit();
        let result = self
            .engine
            .set_composing((!range.is_empty()).then_some(range));
        self.end();
        result
    }

    /// End composing, keeping the text.
    pub fn finish_composing_text(&mut self) -> Result<(), EngineError> {
        if self.engine.composing_range().is_none() {
            return Ok(());
        }
        self.engine.begin_batch_edit();
        let result = self.engine.set_composing(None);
        self.end();
        result
    }

    /// Delete up to `before` bytes before and `after` bytes after the
    /// selection. Both ranges are cut at character boundaries.
    pub fn delete_surrounding_text(&mut self, before: usize, after: usize) -> Result<(), EngineError> {
        let selection = self.engine.selection();
        let buffer = self.engine.buffer();
        let after_end = buffer.clamp_offset(selection.end().saturating_add(after));
        let mut before_start = selection.start().saturating_sub(before);
        while !buffer.is_char_boundary(before_start) {
            before_start += 1;
        }
        self.engine.begin_batch_edit();
        // Delete after the selection first so the offsets before it stay valid.
        let mut result = Ok(());
        if after_end > selection.end() {
            result = self.engine.apply_edit(selection.end()..after_end, "").map(drop);
        }
        if result.is_ok() && before_start < selection.start() {
            result = self
                .engine
                .apply_edit(before_start..selection.start(), "")
                .map(drop);
        }
        self.end();
        result
    }

    /// Select `start..end`. Offsets outside the text are rejected.
    pub fn set_selection(&mut self, start: usize, end: usize) -> Result<(), EngineError> {
        let buffer = self.engine.buffer();
        let len = buffer.len();
        let fits = |offset| offset <= len && buffer.is_char_boundary(offset);
        if !fits(start) || !fits(end) {
            warn!(start, end, len, "input method selection outside the text");
            return Err(EngineError::InvalidRange { start, end, len });
        }
        self.engine.set_selection(start, end);
        Ok(())
    }

    fn end(&mut self) {
        // Balanced with the begin in the same operation.
        let _ = self.engine.end_batch_edit();
    }
}

// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt::Debug;
use core::ops::Range;

use crate::span::{Span, SpanFlags, SpanId};
use crate::{validate_range, Edit, Error};

/// Receives notifications around every text edit of a [`SpannedBuffer`].
///
/// `before_edit` sees the buffer as it was before the edit, `after_edit` sees
/// it with the edit applied and all spans already moved. The edit has been
/// validated before either hook runs, so observers never see a partial edit.
pub trait EditObserver<A> {
    /// Called with the unmodified buffer.
    fn before_edit(&mut self, buffer: &SpannedBuffer<A>, edit: &Edit) {
        let _ = (buffer, edit);
    }

    /// Called with the modified buffer.
    fn after_edit(&mut self, buffer: &SpannedBuffer<A>, edit: &Edit) {
        let _ = (buffer, edit);
    }
}

impl<A> EditObserver<A> for () {}

#[derive(Clone, Debug)]
struct Slot<A> {
    generation: u32,
    span: Option<Span<A>>,
}

/// Mutable text with attached, range-tagged attributes.
#[derive(Clone, Debug)]
pub struct SpannedBuffer<A> {
    text: String,
    slots: Vec<Slot<A>>,
    free: Vec<u32>,
    live: usize,
    next_order: u64,
}

impl<A> Default for SpannedBuffer<A> {
    fn default() -> Self {
        Self {
            text: String::new(),
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            next_order: 0,
        }
    }
}

impl<A> SpannedBuffer<A> {
    /// Create a buffer holding `text` with no spans.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Borrow the text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns the length of the text, in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Returns `true` if the text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns `true` if `index` is a char boundary inside the text.
    pub fn is_char_boundary(&self, index: usize) -> bool {
        self.text.is_char_boundary(index)
    }

    /// Clamp `index` into the text, moving it back to the closest char boundary.
    pub fn clamp_offset(&self, index: usize) -> usize {
        let mut index = index.min(self.text.len());
        while !self.text.is_char_boundary(index) {
            index -= 1;
        }
        index
    }

    /// Insert `text` at byte offset `pos`.
    pub fn insert(&mut self, pos: usize, text: &str) -> Result<Edit, Error> {
        self.edit(pos..pos, text, &mut ())
    }

    /// Delete the byte range `start..end`.
    pub fn delete(&mut self, start: usize, end: usize) -> Result<Edit, Error> {
        self.edit(start..end, "", &mut ())
    }

    /// Replace the byte range `start..end` with `text`.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) -> Result<Edit, Error> {
        self.edit(start..end, text, &mut ())
    }

    /// Replace `range` with `text`, reporting the edit to `observer`.
    ///
    /// The range is validated first; on error nothing is changed and the
    /// observer is not called.
    pub fn edit<O>(&mut self, range: Range<usize>, text: &str, observer: &mut O) -> Result<Edit, Error>
    where
        O: EditObserver<A> + ?Sized,
    {
        validate_range(&self.text, &range)?;
        let edit = Edit::new(range.clone(), text.len());
        observer.before_edit(self, &edit);
        self.text.replace_range(range, text);
        self.shift_spans(&edit);
        observer.after_edit(self, &edit);
        Ok(edit)
    }

    /// Replace the whole text, dropping every span.
    pub fn set_text<O>(&mut self, text: &str, observer: &mut O) -> Edit
    where
        O: EditObserver<A> + ?Sized,
    {
        self.clear_spans();
        let edit = Edit::new(0..self.text.len(), text.len());
        observer.before_edit(self, &edit);
        self.text.clear();
        self.text.push_str(text);
        observer.after_edit(self, &edit);
        edit
    }

    fn shift_spans(&mut self, edit: &Edit) {
        let mut dropped = Vec::new();
        for (index, slot) in (0_u32..).zip(self.slots.iter_mut()) {
            if let Some(span) = slot.span.as_mut() {
                if !span.apply_edit(edit) {
                    dropped.push(index);
                }
            }
        }
        for index in dropped {
            self.release(index);
        }
    }

    /// Attach `attribute` to `range`.
    pub fn add_span(
        &mut self,
        range: Range<usize>,
        attribute: A,
        flags: SpanFlags,
        priority: i32,
    ) -> Result<SpanId, Error> {
        validate_range(&self.text, &range)?;
        let span = Span {
            range,
            attribute,
            priority,
            flags,
            order: self.next_order,
        };
        self.next_order += 1;
        self.live += 1;
        let id = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.span = Some(span);
            SpanId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = u32::try_from(self.slots.len()).expect("span arena exceeds u32::MAX slots");
            self.slots.push(Slot {
                generation: 0,
                span: Some(span),
            });
            SpanId {
                index,
                generation: 0,
            }
        };
        Ok(id)
    }

    /// Detach a span, returning its attribute.
    pub fn remove_span(&mut self, id: SpanId) -> Result<A, Error> {
        if self.span(id).is_none() {
            return Err(Error::UnknownSpan(id));
        }
        self.release(id.index)
            .map(|span| span.attribute)
            .ok_or(Error::UnknownSpan(id))
    }

    fn release(&mut self, index: u32) -> Option<Span<A>> {
        let slot = self.slots.get_mut(index as usize)?;
        let span = slot.span.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        self.live -= 1;
        Some(span)
    }

    /// Move an existing span to a new range.
    pub fn set_span_range(&mut self, id: SpanId, range: Range<usize>) -> Result<(), Error> {
        validate_range(&self.text, &range)?;
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.span.as_mut())
            .ok_or(Error::UnknownSpan(id))?;
        slot.range = range;
        Ok(())
    }

    /// Look up a live span.
    pub fn span(&self, id: SpanId) -> Option<&Span<A>> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.span.as_ref())
    }

    /// The current range of a live span.
    pub fn span_range(&self, id: SpanId) -> Option<Range<usize>> {
        self.span(id).map(Span::range)
    }

    /// Number of live spans.
    pub fn span_count(&self) -> usize {
        self.live
    }

    /// Returns `true` if any span is attached.
    pub fn has_spans(&self) -> bool {
        self.live != 0
    }

    /// Remove all spans.
    pub fn clear_spans(&mut self) {
        for index in (0_u32..).take(self.slots.len()) {
            self.release(index);
        }
    }

    /// All live spans, highest priority first, then in insertion order.
    pub fn spans(&self) -> Vec<(SpanId, &Span<A>)> {
        let mut spans: Vec<_> = self
            .slots
            .iter()
            .zip(0_u32..)
            .filter_map(|(slot, index)| {
                slot.span.as_ref().map(|span| {
                    (
                        SpanId {
                            index,
                            generation: slot.generation,
                        },
                        span,
                    )
                })
            })
            .collect();
        spans.sort_by(|(_, a), (_, b)| b.priority.cmp(&a.priority).then(a.order.cmp(&b.order)));
        spans
    }

    /// Spans overlapping `range`. Empty spans are reported when they sit inside
    /// the range.
    pub fn spans_in(&self, range: Range<usize>) -> impl Iterator<Item = (SpanId, &Span<A>)> + '_ {
        self.spans().into_iter().filter(move |(_, span)| {
            if span.range.is_empty() {
                span.range.start >= range.start && span.range.start <= range.end
            } else {
                span.range.start < range.end && span.range.end > range.start
            }
        })
    }

    /// Spans covering byte `index`.
    pub fn spans_at(&self, index: usize) -> impl Iterator<Item = (SpanId, &Span<A>)> + '_ {
        self.spans()
            .into_iter()
            .filter(move |(_, span)| span.range.contains(&index))
    }

    /// The first offset after `start` and not after `limit` where any span
    /// starts or ends. Returns `limit` if there is none.
    pub fn next_span_transition(&self, start: usize, limit: usize) -> usize {
        self.slots
            .iter()
            .filter_map(|slot| slot.span.as_ref())
            .flat_map(|span| [span.range.start, span.range.end])
            .filter(|offset| *offset > start && *offset < limit)
            .min()
            .unwrap_or(limit)
    }
}

impl<A> core::fmt::Display for SpannedBuffer<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.text)
    }
}

impl<A: Debug> SpannedBuffer<A> {
    /// A compact description of the spans, useful in assertion messages.
    pub fn describe_spans(&self) -> String {
        let mut out = String::new();
        for (_, span) in self.spans() {
            use core::fmt::Write;
            let _ = write!(out, "{:?}@{:?} ", span.attribute, span.range);
        }
        out
    }
}

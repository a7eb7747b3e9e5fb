// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text change notifications.
//!
//! Watchers are registered with a [`TextEngine`](crate::TextEngine) and see
//! every edit three times: before it is applied, right after it is applied,
//! and once more after the engine has updated its own state. Watchers can
//! react by queueing further edits, which are applied in the same batch.

mod session;

use core::fmt;
use core::ops::Range;
use std::collections::VecDeque;

use spanned_text::{Edit, EditObserver, SpannedBuffer};
use tracing::{debug, warn};

pub use self::session::{ChangedRange, EditSession, SessionFlush};

/// Handle to a registered [`TextWatcher`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatcherId(u64);

/// A single edit as seen by a [`TextWatcher`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TextChange<'a> {
    /// The text. Before the edit in `before_change`, after it otherwise.
    pub text: &'a str,
    /// Byte offset of the edit.
    pub start: usize,
    /// Number of bytes removed.
    pub removed: usize,
    /// Number of bytes inserted.
    pub inserted: usize,
}

impl<'a> TextChange<'a> {
    fn new(text: &'a str, edit: &Edit) -> Self {
        Self {
            text,
            start: edit.start,
            removed: edit.removed,
            inserted: edit.inserted,
        }
    }

    /// The inserted text, if `text` is the text after the edit.
    pub fn inserted_text(&self) -> Option<&'a str> {
        self.text.get(self.start..self.start + self.inserted)
    }
}

/// Observer of text edits.
///
/// All methods default to doing nothing. An error returned by a watcher is
/// logged and otherwise ignored; the edit itself is never undone.
pub trait TextWatcher {
    /// Called before `change` is applied. `change.text` is the old text.
    fn before_change(
        &mut self,
        change: &TextChange<'_>,
        cx: &mut WatcherContext,
    ) -> anyhow::Result<()> {
        let _ = (change, cx);
        Ok(())
    }

    /// Called right after `change` was applied. `change.text` is the new
    /// text.
    fn on_change(&mut self, change: &TextChange<'_>, cx: &mut WatcherContext) -> anyhow::Result<()> {
        let _ = (change, cx);
        Ok(())
    }

    /// Called once the engine has caught up with the change.
    fn after_change(&mut self, text: &str, cx: &mut WatcherContext) -> anyhow::Result<()> {
        let _ = (text, cx);
        Ok(())
    }
}

/// An edit queued by a watcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingEdit {
    /// The range to replace, in the text the watcher saw last.
    pub range: Range<usize>,
    /// The replacement.
    pub text: String,
}

/// Lets a [`TextWatcher`] react to a change.
#[derive(Debug, Default)]
pub struct WatcherContext {
    edits: Vec<PendingEdit>,
    detach: bool,
}

impl WatcherContext {
    /// Queue a replacement of `range` with `text`.
    pub fn replace(&mut self, range: Range<usize>, text: impl Into<String>) {
        self.edits.push(PendingEdit {
            range,
            text: text.into(),
        });
    }

    /// Queue an insertion.
    pub fn insert(&mut self, offset: usize, text: impl Into<String>) {
        self.replace(offset..offset, text);
    }

    /// Queue a deletion.
    pub fn delete(&mut self, range: Range<usize>) {
        self.replace(range, "");
    }

    /// Remove this watcher once the current notification round ends.
    pub fn detach(&mut self) {
        self.detach = true;
    }
}

/// Ordered watcher registry and batch bookkeeping of an engine.
#[derive(Default)]
pub(crate) struct ChangeNotifier {
    watchers: Vec<(WatcherId, Box<dyn TextWatcher>)>,
    next_id: u64,
    pending: VecDeque<PendingEdit>,
    pub(crate) session: EditSession,
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field(
                "watchers",
                &self.watchers.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            )
            .field("pending", &self.pending)
            .field("session", &self.session)
            .finish()
    }
}

impl ChangeNotifier {
    pub(crate) fn add(&mut self, watcher: Box<dyn TextWatcher>) -> WatcherId {
        let id = WatcherId(self.next_id);
        self.next_id += 1;
        self.watchers.push((id, watcher));
        id
    }

    pub(crate) fn remove(&mut self, id: WatcherId) -> Option<Box<dyn TextWatcher>> {
        let index = self.watchers.iter().position(|(other, _)| *other == id)?;
        Some(self.watchers.remove(index).1)
    }

    pub(crate) fn len(&self) -> usize {
        self.watchers.len()
    }

    /// Run the after round for `text`.
    pub(crate) fn after_change(&mut self, text: &str) {
        self.dispatch("after_change", |watcher, cx| watcher.after_change(text, cx));
    }

    pub(crate) fn take_pending(&mut self) -> Option<PendingEdit> {
        self.pending.pop_front()
    }

    pub(crate) fn discard_pending(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    fn dispatch<F>(&mut self, phase: &'static str, mut notify: F)
    where
        F: FnMut(&mut dyn TextWatcher, &mut WatcherContext) -> anyhow::Result<()>,
    {
        let mut detached = Vec::new();
        for (id, watcher) in &mut self.watchers {
            let mut cx = WatcherContext::default();
            if let Err(error) = notify(watcher.as_mut(), &mut cx) {
                warn!(watcher = id.0, phase, %error, "text watcher failed");
            }
            self.pending.extend(cx.edits);
            if cx.detach {
                detached.push(*id);
            }
        }
        if !detached.is_empty() {
            debug!(count = detached.len(), "detaching text watchers");
            self.watchers.retain(|(id, _)| !detached.contains(id));
        }
    }
}

impl<A> EditObserver<A> for ChangeNotifier {
    fn before_edit(&mut self, buffer: &SpannedBuffer<A>, edit: &Edit) {
        let change = TextChange::new(buffer.as_str(), edit);
        self.dispatch("before_change", |watcher, cx| {
            watcher.before_change(&change, cx)
        });
    }

    fn after_edit(&mut self, buffer: &SpannedBuffer<A>, edit: &Edit) {
        self.session.record_edit(*edit);
        let change = TextChange::new(buffer.as_str(), edit);
        self.dispatch("on_change", |watcher, cx| watcher.on_change(&change, cx));
    }
}

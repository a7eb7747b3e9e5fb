// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use spanned_text::Edit;
use tracing::warn;

use crate::error::EngineError;

/// The net text change of a batch.
///
/// `start..old_end` in the text before the batch was replaced by
/// `start..new_end` in the text after it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ChangedRange {
    /// First changed byte.
    pub start: usize,
    /// End of the replaced range, before the batch.
    pub old_end: usize,
    /// End of the replacement, after the batch.
    pub new_end: usize,
}

impl ChangedRange {
    /// Signed length change of the text.
    pub fn delta(&self) -> isize {
        self.new_end as isize - self.old_end as isize
    }
}

impl From<Edit> for ChangedRange {
    fn from(edit: Edit) -> Self {
        Self {
            start: edit.start,
            old_end: edit.old_end(),
            new_end: edit.new_end(),
        }
    }
}

/// What happened during a batch, reported once it is closed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionFlush {
    /// The union of all edits, if the text changed.
    pub changed: Option<Edit>,
    /// The selection moved.
    pub selection_changed: bool,
}

impl SessionFlush {
    /// Returns `true` if nothing needs to be reported.
    pub fn is_empty(&self) -> bool {
        self.changed.is_none() && !self.selection_changed
    }
}

/// Nesting counter that accumulates the effect of edits made while a batch
/// is open.
#[derive(Clone, Debug, Default)]
pub struct EditSession {
    depth: usize,
    changed: Option<Edit>,
    selection_changed: bool,
}

impl EditSession {
    /// A session with no open batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a (possibly nested) batch.
    pub fn begin(&mut self) {
        self.depth += 1;
    }

    /// Close a batch.
    ///
    /// Returns the accumulated changes when the outermost batch is closed and
    /// `None` while batches remain open. Closing more batches than were
    /// opened leaves the session untouched.
    pub fn end(&mut self) -> Result<Option<SessionFlush>, EngineError> {
        let Some(depth) = self.depth.checked_sub(1) else {
            warn!("unbalanced end_batch_edit ignored");
            return Err(EngineError::ReentrantBatchImbalance);
        };
        self.depth = depth;
        if depth > 0 {
            return Ok(None);
        }
        Ok(Some(SessionFlush {
            changed: self.changed.take(),
            selection_changed: core::mem::take(&mut self.selection_changed),
        }))
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns `true` while a batch is open.
    pub fn in_batch(&self) -> bool {
        self.depth > 0
    }

    /// Fold `edit` into the changes of the current batch.
    pub fn record_edit(&mut self, edit: Edit) {
        if edit.is_noop() {
            return;
        }
        self.changed = Some(match self.changed {
            Some(changed) => changed.merge(edit),
            None => edit,
        });
    }

    /// Note that the selection moved.
    pub fn record_selection_change(&mut self) {
        self.selection_changed = true;
    }

    /// The accumulated text change so far.
    pub fn pending_change(&self) -> Option<ChangedRange> {
        self.changed.map(ChangedRange::from)
    }
}

// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use spanned_text::Edit;

use super::{cursor_geometry, selection_geometry, CursorBlink, HighlightGeometry, Selection};
use crate::layout::Layout;

/// The current selection with its lazily computed highlight geometry.
///
/// Any change to the selection or the layout marks the cached geometry as
/// stale; it is computed again the next time it is needed.
#[derive(Clone, Debug)]
pub struct SelectionTracker {
    selection: Selection,
    geometry: Option<HighlightGeometry>,
    cursor_width: f32,
    blink: CursorBlink,
}

impl SelectionTracker {
    /// A tracker with the cursor at the start of the text.
    pub fn new(cursor_width: f32) -> Self {
        Self {
            selection: Selection::default(),
            geometry: None,
            cursor_width,
            blink: CursorBlink::new(),
        }
    }

    /// The current selection.
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Replace the selection. Returns `true` if it changed.
    pub fn set_selection(&mut self, selection: Selection) -> bool {
        if selection == self.selection {
            return false;
        }
        self.selection = selection;
        self.geometry = None;
        self.blink.set_collapsed(selection.is_collapsed());
        self.blink.restart();
        true
    }

    /// Move the selection across an edit and clamp it into `len`.
    ///
    /// Returns `true` if the selection changed.
    pub fn adjust_for_edit(&mut self, edit: &Edit, len: usize) -> bool {
        let mapped = self.selection.map_edit(edit);
        let clamped = Selection::new(mapped.anchor().min(len), mapped.focus().min(len));
        self.geometry = None;
        self.set_selection(clamped)
    }

    /// Mark the cached geometry as stale.
    pub fn invalidate_geometry(&mut self) {
        self.geometry = None;
    }

    /// The cached geometry, if it is still valid.
    pub fn cached_geometry(&self) -> Option<&HighlightGeometry> {
        self.geometry.as_ref()
    }

    /// The highlight geometry on `layout`, computing it if stale.
    pub fn geometry(&mut self, layout: &Layout) -> &HighlightGeometry {
        let selection = self.selection;
        let cursor_width = self.cursor_width;
        self.geometry.get_or_insert_with(|| {
            if selection.is_collapsed() {
                cursor_geometry(layout, selection.focus(), cursor_width)
            } else {
                selection_geometry(layout, selection.anchor(), selection.focus())
            }
        })
    }

    /// Change the cursor stroke width.
    pub fn set_cursor_width(&mut self, width: f32) {
        if width != self.cursor_width {
            self.cursor_width = width;
            self.geometry = None;
        }
    }

    /// The cursor blink.
    pub fn blink(&self) -> &CursorBlink {
        &self.blink
    }

    /// The cursor blink, mutably.
    pub fn blink_mut(&mut self) -> &mut CursorBlink {
        &mut self.blink
    }
}

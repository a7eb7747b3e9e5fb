// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;
use std::cell::RefCell;
use std::rc::Rc;

use quill::editing::Selection;
use quill::{ChangedRange, ExtractedText, InputMethodClient};

/// Everything an input method was told.
#[derive(Debug, Default)]
pub(crate) struct ImeLog {
    pub(crate) changes: Vec<ChangedRange>,
    pub(crate) selections: Vec<(Selection, Option<Range<usize>>)>,
    pub(crate) extracted: Vec<ExtractedText>,
}

pub(crate) struct RecordingIme(Rc<RefCell<ImeLog>>);

impl RecordingIme {
    pub(crate) fn new() -> (Box<Self>, Rc<RefCell<ImeLog>>) {
        let log = Rc::new(RefCell::new(ImeLog::default()));
        (Box::new(Self(log.clone())), log)
    }
}

impl InputMethodClient for RecordingIme {
    fn update_extracted_text(&mut self, _: u32, text: &ExtractedText) {
        self.0.borrow_mut().extracted.push(text.clone());
    }

    fn update_selection(&mut self, selection: Selection, composing: Option<Range<usize>>) {
        self.0.borrow_mut().selections.push((selection, composing));
    }

    fn content_changed(&mut self, changed: ChangedRange) {
        self.0.borrow_mut().changes.push(changed);
    }
}

// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;
use std::cell::RefCell;
use std::rc::Rc;

use peniko::kurbo::{BezPath, Point, Rect, Shape};

use super::Color;
use crate::editing::Selection;
use crate::notify::TextChange;
use crate::{
    ChangedRange, ExtractedText, FrameRequest, FrameScheduler, InputMethodClient, Painter,
    TextWatcher, WatcherContext,
};

/// A painting operation.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Op {
    Rect(Rect, Color),
    Path(Rect, Color),
    Text(String, Point, Color),
}

#[derive(Default)]
pub(crate) struct RecordingPainter {
    pub(crate) ops: Vec<Op>,
}

impl RecordingPainter {
    pub(crate) fn texts(&self) -> Vec<(&str, f64)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text(text, origin, _) => Some((text.as_str(), origin.x)),
                _ => None,
            })
            .collect()
    }
}

impl Painter<Color> for RecordingPainter {
    fn fill_rect(&mut self, rect: Rect, brush: &Color) {
        self.ops.push(Op::Rect(rect, *brush));
    }

    fn fill_path(&mut self, path: &BezPath, brush: &Color) {
        self.ops.push(Op::Path(path.bounding_box(), *brush));
    }

    fn draw_text(&mut self, text: &str, origin: Point, brush: &Color) {
        self.ops.push(Op::Text(text.to_owned(), origin, *brush));
    }
}

pub(crate) type WatchLog = Rc<RefCell<Vec<String>>>;

/// Records every notification as a line of text.
pub(crate) struct LogWatcher(pub(crate) WatchLog);

impl TextWatcher for LogWatcher {
    fn before_change(
        &mut self,
        change: &TextChange<'_>,
        _: &mut WatcherContext,
    ) -> anyhow::Result<()> {
        self.0.borrow_mut().push(format!(
            "before {:?} at {} -{} +{}",
            change.text, change.start, change.removed, change.inserted
        ));
        Ok(())
    }

    fn on_change(&mut self, change: &TextChange<'_>, _: &mut WatcherContext) -> anyhow::Result<()> {
        self.0.borrow_mut().push(format!(
            "on {:?} at {} -{} +{}",
            change.text, change.start, change.removed, change.inserted
        ));
        Ok(())
    }

    fn after_change(&mut self, text: &str, _: &mut WatcherContext) -> anyhow::Result<()> {
        self.0.borrow_mut().push(format!("after {text:?}"));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(crate) struct ImeLog {
    pub(crate) content_changes: Vec<ChangedRange>,
    pub(crate) selections: Vec<(Selection, Option<Range<usize>>)>,
    pub(crate) extracted: Vec<(u32, ExtractedText)>,
    pub(crate) restarts: usize,
}

pub(crate) struct RecordingIme(pub(crate) Rc<RefCell<ImeLog>>);

impl RecordingIme {
    pub(crate) fn new() -> (Box<Self>, Rc<RefCell<ImeLog>>) {
        let log = Rc::new(RefCell::new(ImeLog::default()));
        (Box::new(Self(log.clone())), log)
    }
}

impl InputMethodClient for RecordingIme {
    fn update_extracted_text(&mut self, token: u32, text: &ExtractedText) {
        self.0.borrow_mut().extracted.push((token, text.clone()));
    }

    fn update_selection(&mut self, selection: Selection, composing: Option<Range<usize>>) {
        self.0.borrow_mut().selections.push((selection, composing));
    }

    fn content_changed(&mut self, changed: ChangedRange) {
        self.0.borrow_mut().content_changes.push(changed);
    }

    fn restart_input(&mut self) {
        self.0.borrow_mut().restarts += 1;
    }
}

#[derive(Debug, Default)]
pub(crate) struct SchedulerLog {
    pub(crate) requests: Vec<FrameRequest>,
    pub(crate) cancels: usize,
}

pub(crate) struct RecordingScheduler(pub(crate) Rc<RefCell<SchedulerLog>>);

impl RecordingScheduler {
    pub(crate) fn new() -> (Box<Self>, Rc<RefCell<SchedulerLog>>) {
        let log = Rc::new(RefCell::new(SchedulerLog::default()));
        (Box::new(Self(log.clone())), log)
    }
}

impl FrameScheduler for RecordingScheduler {
    fn schedule(&mut self, request: FrameRequest) {
        self.0.borrow_mut().requests.push(request);
    }

    fn cancel(&mut self) {
        self.0.borrow_mut().cancels += 1;
    }
}

// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use pretty_assertions::assert_eq;
use quill::editing::Selection;
use quill::{ChangedRange, ExtractedTextRequest};

use crate::test_name;
use crate::util::{RecordingIme, TestEnv};

fn changed(start: usize, old_end: usize, new_end: usize) -> ChangedRange {
    ChangedRange {
        start,
        old_end,
        new_end,
    }
}

#[test]
fn ime_composition_is_committed() {
    let mut env = TestEnv::editor(test_name!(), "");
    let (ime, log) = RecordingIme::new();
    env.engine.attach_input_method(ime);

    let mut ic = env.engine.input_connection();
    ic.set_composing_text("n", 1).unwrap();
    ic.set_composing_text("ni", 1).unwrap();
    assert_eq!(env.engine.composing_range(), Some(0..2));

    // The composing region is underlined.
    let painter = env.render();
    let underlines: Vec<_> = painter
        .rects
        .iter()
        .map(|(rect, _)| (rect.x0, rect.x1))
        .collect();
    assert_eq!(underlines, [(0.0, 20.0)]);

    env.engine.input_connection().commit_text("你", 1).unwrap();
    assert_eq!(env.engine.text(), "你");
    assert_eq!(env.engine.composing_range(), None);
    assert_eq!(env.engine.selection(), Selection::collapsed(3));

    let log = log.borrow();
    assert_eq!(
        log.changes,
        [changed(0, 0, 1), changed(0, 1, 2), changed(0, 2, 3)]
    );
    assert_eq!(
        log.selections.last(),
        Some(&(Selection::collapsed(3), None))
    );
}

#[test]
fn ime_monitored_text_follows_edits() {
    let mut env = TestEnv::editor(test_name!(), "café");
    let (ime, log) = RecordingIme::new();
    env.engine.attach_input_method(ime);
    env.engine.set_selection(5, 5);

    let extracted = env
        .engine
        .input_connection()
        .extract_text(ExtractedTextRequest {
            token: 1,
            monitor: true,
            range: None,
        })
        .unwrap();
    assert_eq!(extracted.text, "café");
    assert_eq!(extracted.selection, Selection::collapsed(5));

    env.engine.input_connection().commit_text("s", 1).unwrap();
    env.driver().backdelete().unwrap();
    env.driver().backdelete().unwrap();

    let log = log.borrow();
    let updates: Vec<_> = log
        .extracted
        .iter()
        .map(|text| (text.text.as_str(), text.start_offset, text.partial_range.clone()))
        .collect();
    assert_eq!(
        updates,
        [("s", 5, Some(5..5)), ("", 5, Some(5..6)), ("", 3, Some(3..5))]
    );
    assert_eq!(env.engine.text(), "caf");
}

#[test]
fn ime_surrounding_deletion_keeps_characters_whole() {
    let mut env = TestEnv::editor(test_name!(), "a😀b");
    env.engine.set_selection(6, 6);
    let mut ic = env.engine.input_connection();
    assert_eq!(ic.text_before_cursor(2), "b");
    ic.delete_surrounding_text(2, 0).unwrap();
    assert_eq!(ic.text_before_cursor(10), "a😀");
    ic.delete_surrounding_text(4, 0).unwrap();
    assert_eq!(env.engine.text(), "a");
}

#[test]
fn ime_rejects_selection_outside_the_text() {
    let mut env = TestEnv::editor(test_name!(), "a😀b");
    let mut ic = env.engine.input_connection();
    // Inside the emoji.
    assert!(ic.set_selection(2, 2).is_err());
    assert!(ic.set_selection(0, 7).is_err());
    ic.set_selection(1, 5).unwrap();
    assert_eq!(ic.selected_text(), "😀");
}

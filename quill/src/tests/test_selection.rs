// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::time::Duration;

use peniko::kurbo::Rect;

use super::utils::TestEnv;
use crate::editing::{BlinkState, HighlightKind, Selection};
use crate::{EngineError, test_name};

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn contains(outer: Rect, inner: Rect) -> bool {
    outer.x0 <= inner.x0 && outer.y0 <= inner.y0 && outer.x1 >= inner.x1 && outer.y1 >= inner.y1
}

#[test]
fn cursor_is_a_stroke_at_the_caret() {
    let mut env = TestEnv::new(test_name!());
    let mut engine = env.editor("Hello");
    engine.set_selection(2, 2);
    let mut driver = env.driver(&mut engine);
    let highlight = driver.highlight();
    assert_eq!(highlight.kind(), HighlightKind::Cursor);
    assert_eq!(highlight.rects(), &[Rect::new(19.5, 0.0, 20.5, 13.0)]);
}

#[test]
fn cursor_hides_without_focus() {
    let env = TestEnv::new(test_name!());
    let mut engine = env.editor("Hello");
    engine.tick(ms(0));
    assert_eq!(engine.blink_state(), BlinkState::Visible);
    engine.tick(ms(600));
    assert_eq!(engine.blink_state(), BlinkState::Hidden);
    engine.tick(ms(1100));
    assert_eq!(engine.blink_state(), BlinkState::Visible);

    engine.set_focused(false);
    for now in [1200, 1700, 2200] {
        engine.tick(ms(now));
        assert_eq!(engine.blink_state(), BlinkState::Hidden);
    }

    // Focus brings the cursor back, starting a new cycle.
    engine.set_focused(true);
    engine.tick(ms(2300));
    assert_eq!(engine.blink_state(), BlinkState::Visible);
}

#[test]
fn moving_the_cursor_restarts_the_blink() {
    let env = TestEnv::new(test_name!());
    let mut engine = env.editor("Hello");
    engine.tick(ms(0));
    engine.tick(ms(600));
    assert_eq!(engine.blink_state(), BlinkState::Hidden);
    engine.set_selection(3, 3);
    assert_eq!(engine.blink_state(), BlinkState::Visible);
    engine.tick(ms(700));
    assert_eq!(engine.blink_state(), BlinkState::Visible);
}

#[test]
fn range_selection_stops_the_blink() {
    let env = TestEnv::new(test_name!());
    let mut engine = env.editor("Hello");
    engine.tick(ms(0));
    engine.set_selection(1, 4);
    for now in [100, 600, 1100] {
        engine.tick(ms(now));
        assert_eq!(engine.blink_state(), BlinkState::Hidden);
    }
    engine.set_selection(2, 2);
    assert_eq!(engine.blink_state(), BlinkState::Visible);
}

#[test]
fn selection_is_clamped_into_the_text() {
    let env = TestEnv::new(test_name!());
    let mut engine = env.engine("héllo");
    engine.set_selection(10, 99);
    assert_eq!(engine.selection(), Selection::collapsed(6));
    // Inside `é` moves to its start.
    engine.set_selection(2, 2);
    assert_eq!(engine.selection(), Selection::collapsed(1));
    // Reversed selections keep their direction.
    engine.set_selection(4, 1);
    assert_eq!(engine.selection().anchor(), 4);
    assert_eq!(engine.selection().focus(), 1);
    assert_eq!(engine.selected_text(), "él");
}

#[test]
fn edits_keep_the_selection_inside_the_text() {
    let mut env = TestEnv::new(test_name!());
    let mut engine = env.editor("Hello world");
    engine.set_selection(6, 11);
    let mut driver = env.driver(&mut engine);
    driver.insert(0, ">> ").unwrap();
    assert_eq!(driver.engine.selection(), Selection::new(9, 14));
    assert_eq!(driver.engine.selected_text(), "world");

    driver.engine.select_all();
    let len = driver.engine.text().len();
    driver.delete(0, len).unwrap();
    assert_eq!(driver.engine.text(), "");
    assert_eq!(driver.engine.selection(), Selection::collapsed(0));
}

#[test]
fn typing_moves_the_cursor_past_the_text() {
    let mut env = TestEnv::new(test_name!());
    let mut engine = env.editor("Hello");
    engine.set_selection(5, 5);
    let mut driver = env.driver(&mut engine);
    driver.insert_or_replace_selection(" there").unwrap();
    assert_eq!(driver.engine.selection(), Selection::collapsed(11));

    driver.engine.set_selection(0, 5);
    driver.insert_or_replace_selection("Hi").unwrap();
    assert_eq!(driver.engine.text(), "Hi there");
    assert_eq!(driver.engine.selection(), Selection::collapsed(2));
}

#[test]
fn deleting_around_the_cursor() {
    let mut env = TestEnv::new(test_name!());
    let mut engine = env.editor("héllo");
    engine.set_selection(3, 3);
    let mut driver = env.driver(&mut engine);
    driver.backdelete().unwrap();
    assert_eq!(driver.engine.text(), "hllo");
    assert_eq!(driver.engine.selection(), Selection::collapsed(1));

    driver.engine.set_text("a\r\nb");
    driver.engine.set_selection(3, 3);
    driver.backdelete().unwrap();
    assert_eq!(driver.engine.text(), "ab");

    driver.engine.set_text("e\u{301}x");
    driver.delete_forward().unwrap();
    assert_eq!(driver.engine.text(), "x");

    // Nothing to delete at the ends.
    driver.backdelete().unwrap();
    driver.engine.set_selection(1, 1);
    driver.delete_forward().unwrap();
    assert_eq!(driver.engine.text(), "x");
}

#[test]
fn points_map_to_the_closest_offset() {
    let mut env = TestEnv::new(test_name!());
    let mut engine = env.editor("Hello world");
    let mut driver = env.driver(&mut engine);
    driver.move_to_point(32.0, 5.0);
    assert_eq!(driver.engine.selection(), Selection::collapsed(3));
    driver.select_to_point(76.0, 5.0);
    assert_eq!(driver.engine.selection(), Selection::new(3, 8));
    assert_eq!(driver.engine.selected_text(), "lo wo");
    assert_eq!(driver.highlight().kind(), HighlightKind::Selection);
}

#[test]
fn invalidation_covers_old_and_new_highlights() {
    let mut env = TestEnv::new(test_name!());
    let mut engine = env.editor("one\ntwo\nthree");
    let mut driver = env.driver(&mut engine);
    let selections = [
        Selection::collapsed(0),
        Selection::collapsed(5),
        Selection::new(1, 10),
        Selection::new(13, 2),
        Selection::collapsed(13),
    ];
    for old in selections {
        for new in selections {
            let rect = driver.invalidation_rect(old, new).unwrap();
            for selection in [old, new] {
                let bounds = if selection.is_collapsed() {
                    driver.cursor_path(selection.focus()).bounds()
                } else {
                    driver
                        .selection_path(selection.anchor(), selection.focus())
                        .bounds()
                };
                assert!(contains(rect, bounds.unwrap()), "{rect:?} misses {selection:?}");
            }
        }
    }
}

#[test]
fn selection_moves_only_invalidate_the_highlight() {
    let mut env = TestEnv::new(test_name!());
    let mut engine = env.editor("one\ntwo\nthree");
    let mut driver = env.driver(&mut engine);
    driver.highlight();
    let old = driver.highlight().bounds().unwrap();
    driver.engine.take_invalidation();

    driver.engine.set_selection(4, 4);
    let new = driver.highlight().bounds().unwrap();
    let invalidation = driver.engine.take_invalidation();
    assert!(!invalidation.relayout);
    assert!(!invalidation.redraw);
    let dirty = invalidation.dirty.unwrap();
    assert!(contains(dirty, old));
    assert!(contains(dirty, new));
}

#[test]
fn geometry_needs_a_current_layout() {
    let mut env = TestEnv::new(test_name!());
    let mut engine = env.editor("Hello");
    assert_eq!(
        engine.try_highlight().map(|_| ()),
        Err(EngineError::StaleGeometryAccess)
    );
    env.driver(&mut engine).layout();
    assert!(engine.try_highlight().is_ok());

    env.driver(&mut engine).insert(0, "!").unwrap();
    assert_eq!(
        engine.try_highlight().map(|_| ()),
        Err(EngineError::StaleGeometryAccess)
    );
    assert!(engine.try_layout().is_none());
}

#[test]
fn cut_and_copy() {
    let mut env = TestEnv::new(test_name!());
    let mut engine = env.editor("Hello world");
    let mut driver = env.driver(&mut engine);
    assert_eq!(driver.copy_selection(ms(0)), None);

    driver.engine.set_selection(0, 5);
    let cut = driver.cut_selection(Duration::from_secs(10)).unwrap();
    assert_eq!(cut.as_deref(), Some("Hello"));
    assert_eq!(driver.engine.text(), " world");
    assert_eq!(driver.engine.selection(), Selection::collapsed(0));
    assert!(driver.engine.recently_cut_or_copied(Duration::from_secs(11)));
    assert!(!driver.engine.recently_cut_or_copied(Duration::from_secs(30)));
}

// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::{Point, Rect};

use super::utils::{line_ranges, Color, Op, RecordingPainter, TestEnv};
use crate::editing::Selection;
use crate::{
    ConfigError, DrawColors, EngineError, SavedState, SpanFlags, SpanStyle, TextConfig,
    TextEngine, test_name,
};

const COLORS: DrawColors<Color> = DrawColors {
    text: 1,
    highlight: 2,
    cursor: 3,
};

#[test]
fn invalid_configs_are_rejected() {
    assert_eq!(
        TextEngine::<Color>::new(TextConfig::default().with_max_lines(0)).map(drop),
        Err(ConfigError::ZeroMaxLines)
    );
    let env = TestEnv::new(test_name!());
    let mut engine = env.engine("abc");
    let bad = TextConfig {
        density: 0.0,
        ..TextConfig::default()
    };
    assert_eq!(engine.set_config(bad), Err(ConfigError::InvalidDensity(0.0)));
    assert_eq!(engine.config(), &TextConfig::default());
}

#[test]
fn layers_are_painted_in_order() {
    let mut env = TestEnv::new(test_name!());
    let mut engine = env.engine("Hello world");
    engine.set_colors(COLORS);
    engine.set_selectable(true);
    engine
        .add_span(0..5, SpanStyle::Background(10), SpanFlags::EXCLUSIVE_EXCLUSIVE, 0)
        .unwrap();
    engine
        .add_span(6..11, SpanStyle::Underline(None), SpanFlags::EXCLUSIVE_EXCLUSIVE, 0)
        .unwrap();
    engine
        .add_span(0..2, SpanStyle::Foreground(20), SpanFlags::EXCLUSIVE_EXCLUSIVE, 0)
        .unwrap();
    engine.set_selection(0, 5);

    let mut painter = RecordingPainter::default();
    env.driver(&mut engine)
        .draw(&mut painter, Rect::new(0.0, 0.0, 200.0, 50.0));
    assert_eq!(
        painter.ops,
        [
            Op::Rect(Rect::new(0.0, 0.0, 50.0, 13.0), 10),
            Op::Rect(Rect::new(60.0, 11.0, 110.0, 12.0), 1),
            Op::Text("He".into(), Point::new(0.0, 10.0), 20),
            Op::Text("llo world".into(), Point::new(20.0, 10.0), 1),
            Op::Path(Rect::new(0.0, 0.0, 50.0, 13.0), 2),
        ]
    );
}

#[test]
fn cursor_is_painted_while_visible() {
    let mut env = TestEnv::new(test_name!());
    let mut engine = env.editor("ab");
    engine.set_colors(COLORS);
    engine.set_selection(1, 1);
    let clip = Rect::new(0.0, 0.0, 100.0, 100.0);

    let mut driver = env.driver(&mut engine);
    driver.tick(core::time::Duration::ZERO);
    let mut painter = RecordingPainter::default();
    driver.draw(&mut painter, clip);
    assert_eq!(
        painter.ops.last(),
        Some(&Op::Path(Rect::new(9.5, 0.0, 10.5, 13.0), 3))
    );

    driver.engine.set_focused(false);
    let mut painter = RecordingPainter::default();
    driver.draw(&mut painter, clip);
    assert!(painter.ops.iter().all(|op| matches!(op, Op::Text(..))));
}

#[test]
fn only_lines_in_the_clip_are_painted() {
    let mut env = TestEnv::new(test_name!());
    let mut engine = env.engine("a\nb\nc");
    let mut painter = RecordingPainter::default();
    // Lines end at 12, 22 and 33.
    env.driver(&mut engine)
        .draw(&mut painter, Rect::new(0.0, 12.0, 100.0, 22.0));
    assert_eq!(painter.texts(), [("b", 0.0)]);
}

#[test]
fn ellipsis_is_painted_in_place_of_hidden_text() {
    let mut env = TestEnv::new(test_name!());
    let config = TextConfig::single_line(crate::Truncation::End);
    let mut engine = env.engine_with("Hello World", config);
    engine.set_width(Some(60.0));
    let mut painter = RecordingPainter::default();
    env.driver(&mut engine)
        .draw(&mut painter, Rect::new(0.0, 0.0, 60.0, 20.0));
    assert_eq!(painter.texts(), [("Hello", 0.0), ("\u{2026}", 50.0)]);
}

#[test]
fn insert_then_delete_restores_text_and_lines() {
    let mut env = TestEnv::new(test_name!());
    let original = "The quick brown fox\njumps over the lazy dog";
    let mut engine = env.editor(original);
    engine.set_width(Some(80.0));
    let expected = line_ranges(env.driver(&mut engine).layout());

    for offset in [0, 4, 19, 20, original.len()] {
        for inserted in ["x", " ", "\n", "wide words here"] {
            let mut driver = env.driver(&mut engine);
            driver.insert(offset, inserted).unwrap();
            driver.layout();
            driver.delete(offset, offset + inserted.len()).unwrap();
            assert_eq!(driver.engine.text(), original);
            assert_eq!(
                line_ranges(driver.layout()),
                expected,
                "inserting {inserted:?} at {offset}"
            );
        }
    }
}

#[test]
fn bad_edits_leave_the_text_alone() {
    let mut env = TestEnv::new(test_name!());
    let mut engine = env.editor("héllo");
    let generation = engine.generation();
    let mut driver = env.driver(&mut engine);
    assert!(matches!(
        driver.replace(3, 1, "x"),
        Err(EngineError::InvalidRange { start: 3, end: 1, .. })
    ));
    assert!(matches!(
        driver.delete(0, 99),
        Err(EngineError::Buffer(_))
    ));
    assert!(matches!(driver.insert(2, "x"), Err(EngineError::Buffer(_))));
    assert_eq!(engine.text(), "héllo");
    assert_eq!(engine.generation(), generation);
}

#[test]
fn generation_tracks_visible_changes() {
    let mut env = TestEnv::new(test_name!());
    let mut engine = env.editor("abc");
    let start = engine.generation();
    engine.set_selection(0, 0);
    assert_eq!(engine.generation(), start);
    engine.set_selection(1, 2);
    let selected = engine.generation();
    assert_ne!(selected, start);
    env.driver(&mut engine).insert(0, "x").unwrap();
    assert_ne!(engine.generation(), selected);
}

#[test]
fn replacing_the_text_drops_spans_and_selection() {
    let env = TestEnv::new(test_name!());
    let mut engine = env.engine("Hello");
    engine
        .add_span(0..5, SpanStyle::Background(4), SpanFlags::INCLUSIVE_INCLUSIVE, 1)
        .unwrap();
    engine.select_all();
    engine.set_text("Bye");
    assert!(!engine.buffer().has_spans());
    assert_eq!(engine.selection(), Selection::collapsed(0));
}

#[test]
fn spans_can_be_removed() {
    let env = TestEnv::new(test_name!());
    let mut engine = env.engine("Hello");
    let id = engine
        .add_span(1..3, SpanStyle::Strikethrough(Some(5)), SpanFlags::EXCLUSIVE_EXCLUSIVE, 0)
        .unwrap();
    assert_eq!(
        engine.remove_span(id),
        Ok(SpanStyle::Strikethrough(Some(5)))
    );
    assert!(matches!(engine.remove_span(id), Err(EngineError::Buffer(_))));
}

#[test]
fn state_survives_a_round_trip() {
    let env = TestEnv::new(test_name!());
    let mut engine = env.engine("Hello");
    engine.set_selection(1, 3);
    let state = engine.save_state();
    assert_eq!(
        state,
        SavedState {
            selection_start: 1,
            selection_end: 3,
            frozen_text: None,
            frozen_with_focus: false,
        }
    );

    let mut restored = env.engine("Hello");
    restored.restore_state(&state).unwrap();
    assert_eq!(restored.selection(), Selection::new(1, 3));
}

#[test]
fn frozen_text_is_restored() {
    let env = TestEnv::new(test_name!());
    let config = TextConfig {
        freezes_text: true,
        ..TextConfig::default()
    };
    let mut engine = env.engine_with("draft", config.clone());
    engine.set_focused(true);
    engine.set_selection(5, 5);
    let state = engine.save_state();

    let mut restored = env.engine_with("", config);
    restored.restore_state(&state).unwrap();
    assert_eq!(restored.text(), "draft");
    assert_eq!(restored.selection(), Selection::collapsed(5));
    assert!(restored.was_frozen_with_focus());
}

#[test]
fn out_of_range_state_is_rejected() {
    let env = TestEnv::new(test_name!());
    let mut engine = env.engine("Hello");
    engine.set_selection(2, 2);
    let state = SavedState {
        selection_start: 1,
        selection_end: 99,
        ..SavedState::default()
    };
    assert_eq!(
        engine.restore_state(&state),
        Err(EngineError::InvalidRange {
            start: 1,
            end: 99,
            len: 5
        })
    );
    assert_eq!(engine.selection(), Selection::collapsed(2));
}

// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Once;

use peniko::Color;
use peniko::kurbo::Rect;
use quill::{
    DrawColors, LayoutContext, Monospace, TextConfig, TextEngine, TextEngineDriver,
};
use tracing_subscriber::EnvFilter;

use super::{ColorBrush, GridPainter};

/// Advance of every character.
pub(crate) const CELL: f32 = 10.0;

pub(crate) const TEXT_COLOR: Color = Color::BLACK;
pub(crate) const HIGHLIGHT_COLOR: Color = Color::from_rgb8(0x33, 0x99, 0xff);
pub(crate) const CURSOR_COLOR: Color = Color::from_rgb8(0xff, 0x00, 0x00);

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let env_filter = EnvFilter::builder()
            .with_default_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
            .from_env_lossy();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_test_writer()
            .compact()
            .try_init();
    });
}

pub(crate) struct TestEnv {
    test_name: String,
    measure: Monospace,
    layout_cx: LayoutContext,
    pub(crate) engine: TextEngine<ColorBrush>,
}

impl TestEnv {
    pub(crate) fn new(test_name: &str, text: &str, config: TextConfig) -> Self {
        init_tracing();
        let mut engine = TextEngine::new(config)
            .unwrap_or_else(|err| panic!("invalid config in {test_name}: {err}"));
        engine.set_text(text);
        engine.set_colors(DrawColors {
            text: ColorBrush::new(TEXT_COLOR),
            highlight: ColorBrush::new(HIGHLIGHT_COLOR),
            cursor: ColorBrush::new(CURSOR_COLOR),
        });
        engine.take_invalidation();
        Self {
            test_name: test_name.to_owned(),
            measure: Monospace::new(CELL),
            layout_cx: LayoutContext::new(),
            engine,
        }
    }

    /// An editable, focused engine.
    pub(crate) fn editor(test_name: &str, text: &str) -> Self {
        let mut env = Self::new(test_name, text, TextConfig::default());
        env.engine.set_editable(true);
        env.engine.set_focused(true);
        env.engine.take_invalidation();
        env
    }

    pub(crate) fn driver(&mut self) -> TextEngineDriver<'_, ColorBrush> {
        self.engine.driver(&self.measure, &mut self.layout_cx)
    }

    pub(crate) fn measure(&self) -> &Monospace {
        &self.measure
    }

    /// Paint everything and return the text rows.
    pub(crate) fn render(&mut self) -> GridPainter {
        let mut painter = GridPainter::new(f64::from(CELL));
        let clip = Rect::new(-1e6, -1e6, 1e6, 1e6);
        let mut driver = self.driver();
        let layout = driver.layout();
        for line in 0..layout.line_count() {
            painter.add_row(f64::from(layout.line_baseline(line)));
        }
        driver.draw(&mut painter, clip);
        painter
    }

    /// Assert the text rows that would be on screen.
    #[track_caller]
    pub(crate) fn assert_rows(&mut self, expected: &[&str]) {
        let rows = self.render().rows();
        pretty_assertions::assert_eq!(rows, expected, "unexpected rows in {}", self.test_name);
    }
}

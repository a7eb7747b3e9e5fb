// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use crate::layout::LayoutRequest;
use crate::{Layout, LayoutContext, Monospace, TextConfig, TextEngine, TextEngineDriver};

/// Brush used by the tests.
pub(crate) type Color = u32;

/// Every character is this wide.
pub(crate) const ADVANCE: f32 = 10.0;

pub(crate) struct TestEnv {
    test_name: String,
    measure: Monospace,
    layout_cx: LayoutContext,
}

impl TestEnv {
    pub(crate) fn new(test_name: &str) -> Self {
        Self {
            test_name: test_name.to_owned(),
            measure: Monospace::new(ADVANCE),
            layout_cx: LayoutContext::new(),
        }
    }

    pub(crate) fn engine(&self, text: &str) -> TextEngine<Color> {
        self.engine_with(text, TextConfig::default())
    }

    pub(crate) fn engine_with(&self, text: &str, config: TextConfig) -> TextEngine<Color> {
        let mut engine = TextEngine::new(config).unwrap();
        engine.set_text(text);
        // Don't let the initial text count as a change in tests.
        engine.take_invalidation();
        engine
    }

    pub(crate) fn editor(&self, text: &str) -> TextEngine<Color> {
        let mut engine = self.engine(text);
        engine.set_editable(true);
        engine.set_focused(true);
        engine.take_invalidation();
        engine
    }

    pub(crate) fn driver<'a>(
        &'a mut self,
        engine: &'a mut TextEngine<Color>,
    ) -> TextEngineDriver<'a, Color> {
        engine.driver(&self.measure, &mut self.layout_cx)
    }

    pub(crate) fn layout(&mut self, text: &str, width: f32, config: &TextConfig) -> Layout {
        self.layout_cx
            .build(&LayoutRequest::plain(text, width), config, &self.measure)
    }

    pub(crate) fn measure(&self) -> &Monospace {
        &self.measure
    }

    /// Assert the text shown on each line.
    #[track_caller]
    pub(crate) fn assert_lines(&self, layout: &Layout, text: &str, expected: &[&str]) {
        let lines: Vec<&str> = line_ranges(layout)
            .into_iter()
            .map(|range| &text[range])
            .collect();
        assert_eq!(lines, expected, "unexpected lines in {}", self.test_name);
    }
}

pub(crate) fn line_ranges(layout: &Layout) -> Vec<Range<usize>> {
    layout.lines().map(|line| line.text_range()).collect()
}

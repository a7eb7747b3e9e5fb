// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A painter that places drawn text on a character grid, so tests can compare
//! what would be on screen with plain strings.

use std::collections::BTreeMap;

use peniko::Color;
use peniko::kurbo::{BezPath, Point, Rect, Shape};
use quill::Painter;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ColorBrush {
    pub(crate) color: Color,
}

impl ColorBrush {
    pub(crate) fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Default for ColorBrush {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
        }
    }
}

/// Places every character `cell` units to the right of the previous one, on
/// one row per baseline.
#[derive(Debug)]
pub(crate) struct GridPainter {
    cell: f64,
    rows: BTreeMap<i64, Vec<char>>,
    /// Bounds of filled paths, in paint order.
    pub(crate) paths: Vec<(Rect, ColorBrush)>,
    /// Filled rectangles, in paint order.
    pub(crate) rects: Vec<(Rect, ColorBrush)>,
}

impl GridPainter {
    pub(crate) fn new(cell: f64) -> Self {
        Self {
            cell,
            rows: BTreeMap::new(),
            paths: Vec::new(),
            rects: Vec::new(),
        }
    }

    /// Make sure a row exists for `baseline`, even if nothing is drawn on it.
    pub(crate) fn add_row(&mut self, baseline: f64) {
        self.rows.entry(baseline.round() as i64).or_default();
    }

    /// The rows from top to bottom, without trailing spaces.
    pub(crate) fn rows(&self) -> Vec<String> {
        self.rows
            .values()
            .map(|row| row.iter().collect::<String>().trim_end().to_owned())
            .collect()
    }
}

impl Painter<ColorBrush> for GridPainter {
    fn fill_rect(&mut self, rect: Rect, brush: &ColorBrush) {
        self.rects.push((rect, *brush));
    }

    fn fill_path(&mut self, path: &BezPath, brush: &ColorBrush) {
        self.paths.push((path.bounding_box(), *brush));
    }

    fn draw_text(&mut self, text: &str, origin: Point, _: &ColorBrush) {
        let row = self.rows.entry(origin.y.round() as i64).or_default();
        let mut column = (origin.x / self.cell).round().max(0.0) as usize;
        for c in text.chars().filter(|c| !c.is_control()) {
            if row.len() <= column {
                row.resize(column + 1, ' ');
            }
            row[column] = c;
            column += 1;
        }
    }
}

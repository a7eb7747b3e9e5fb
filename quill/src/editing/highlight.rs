// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::{BezPath, Rect};
use smallvec::SmallVec;

use crate::layout::{ItemKind, Layout, LayoutData};

/// Whether a [`HighlightGeometry`] shows a cursor or a range.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum HighlightKind {
    /// A collapsed selection.
    #[default]
    Cursor,
    /// A non-empty selection.
    Selection,
}

/// The painted shape of a cursor or selection.
#[derive(Clone, Debug, Default)]
pub struct HighlightGeometry {
    kind: HighlightKind,
    rects: SmallVec<[Rect; 4]>,
    path: BezPath,
}

impl HighlightGeometry {
    fn new(kind: HighlightKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    fn push(&mut self, rect: Rect) {
        self.path.move_to((rect.x0, rect.y0));
        self.path.line_to((rect.x1, rect.y0));
        self.path.line_to((rect.x1, rect.y1));
        self.path.line_to((rect.x0, rect.y1));
        self.path.close_path();
        self.rects.push(rect);
    }

    /// What the geometry shows.
    pub fn kind(&self) -> HighlightKind {
        self.kind
    }

    /// The outline to fill, one closed subpath per rectangle.
    pub fn path(&self) -> &BezPath {
        &self.path
    }

    /// One rectangle per covered line.
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Returns `true` if nothing is painted.
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// The union of all rectangles.
    pub fn bounds(&self) -> Option<Rect> {
        self.rects.iter().copied().reduce(|a, b| a.union(b))
    }
}

/// A vertical stroke at the caret position of `offset`, as tall as its line.
///
/// The stroke is at least one unit wide.
pub fn cursor_geometry(layout: &Layout, offset: usize, width: f32) -> HighlightGeometry {
    let line = layout.line_for_offset(offset);
    let x = f64::from(layout.primary_horizontal(offset));
    let half = f64::from(width.max(1.0)) * 0.5;
    let mut geometry = HighlightGeometry::new(HighlightKind::Cursor);
    geometry.push(Rect::new(
        x - half,
        f64::from(layout.line_top(line)),
        x + half,
        f64::from(layout.line_bottom(line)),
    ));
    geometry
}

/// One rectangle per line covering the text between `start` and `end`.
///
/// Selected lines without visible content still get a narrow rectangle.
pub fn selection_geometry(layout: &Layout, start: usize, end: usize) -> HighlightGeometry {
    // Ensure we add some visual indicator for selected empty lines.
    const MIN_RECT_WIDTH: f64 = 8.0;

    let mut geometry = HighlightGeometry::new(HighlightKind::Selection);
    for_each_range_rect(layout, start, end, MIN_RECT_WIDTH, |_, rect| geometry.push(rect));
    geometry
}

/// Calls `f` with the line index and rectangle of every visual run of text
/// between `start` and `end`, at least `min_width` wide.
pub(crate) fn for_each_range_rect(
    layout: &Layout,
    start: usize,
    end: usize,
    min_width: f64,
    mut f: impl FnMut(usize, Rect),
) {
    let (start, end) = (start.min(end), start.max(end));
    if start == end {
        return;
    }
    let data = layout.data();
    let first = data.line_index_for_offset(start);
    let last = data.line_index_for_offset(end);
    for (index, line) in data.lines.iter().enumerate().take(last + 1).skip(first) {
        let top = f64::from(line.metrics.top);
        let bottom = f64::from(line.metrics.bottom);
        let mut push_run = |run: (f32, f32)| {
            let a = f64::from(LayoutData::visual_x(line, run.0));
            let b = f64::from(LayoutData::visual_x(line, run.1));
            let x0 = a.min(b);
            let width = (a.max(b) - x0).max(min_width);
            f(index, Rect::new(x0, top, x0 + width, bottom));
        };
        let mut run: Option<(f32, f32)> = None;
        for item in data.line_items(line) {
            let selected = item.kind != ItemKind::Hyphen
                && item.text_range.start < end
                && item.text_range.end > start;
            if selected {
                let from = run.map_or(item.x, |run| run.0);
                run = Some((from, item.x + item.advance));
            } else if let Some(done) = run.take() {
                push_run(done);
            }
        }
        if let Some(done) = run {
            push_run(done);
        }
    }
}

fn line_above(layout: &Layout, y: f64) -> Option<usize> {
    layout.line_for_vertical(y as f32).checked_sub(1)
}

/// The area to repaint when a highlight changes from `old` to `new`.
///
/// Covers both shapes, grows upwards by the descent of the line above so
/// glyphs reaching into the highlighted line are repainted, and is rounded
/// out to whole units.
pub fn invalidation_rect(layout: &Layout, old: Option<Rect>, new: Option<Rect>) -> Option<Rect> {
    let union = match (old, new) {
        (Some(old), Some(new)) => old.union(new),
        (Some(rect), None) | (None, Some(rect)) => rect,
        (None, None) => return None,
    };
    let top = match line_above(layout, union.y0) {
        Some(line) => union.y0 - f64::from(layout.line_descent(line)),
        None => union.y0,
    };
    Some(Rect::new(
        union.x0.floor(),
        top.floor(),
        union.x1.ceil(),
        union.y1.ceil(),
    ))
}

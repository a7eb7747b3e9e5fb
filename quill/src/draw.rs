// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Painting a layout with its spans and highlights.

use core::ops::Range;

use peniko::kurbo::{BezPath, Point, Rect, Vec2};
use spanned_text::SpannedBuffer;

use crate::editing::{for_each_range_rect, HighlightGeometry, HighlightKind};
use crate::layout::{ClusterKind, ItemKind, Layout, LayoutData};
use crate::style::{Brush, SpanStyle};

const ELLIPSIS: &str = "\u{2026}";
const HYPHEN: &str = "-";

/// Trait for types that can paint text and highlights.
pub trait Painter<B: Brush> {
    /// Fill a rectangle. Used for backgrounds and decorations.
    fn fill_rect(&mut self, rect: Rect, brush: &B);

    /// Fill a path. Used for cursors and selections.
    fn fill_path(&mut self, path: &BezPath, brush: &B);

    /// Draw a run of text with its left edge at `origin.x` and its baseline
    /// at `origin.y`.
    fn draw_text(&mut self, text: &str, origin: Point, brush: &B);
}

/// Brushes used where no span applies.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawColors<B: Brush> {
    /// Text without a foreground span.
    pub text: B,
    /// Selection fill.
    pub highlight: B,
    /// Cursor fill.
    pub cursor: B,
}

/// Everything needed to paint one frame.
pub(crate) struct Scene<'a, B: Brush> {
    pub(crate) layout: &'a Layout,
    pub(crate) buffer: &'a SpannedBuffer<SpanStyle<B>>,
    pub(crate) colors: &'a DrawColors<B>,
    pub(crate) highlight: Option<&'a HighlightGeometry>,
    /// Marquee scroll, positive to the left.
    pub(crate) scroll: f32,
    /// Position of the marquee ghost copy, when one is visible.
    pub(crate) ghost_offset: Option<f32>,
}

impl<B: Brush> Scene<'_, B> {
    /// Paint everything intersecting `clip`.
    pub(crate) fn paint(&self, painter: &mut impl Painter<B>, clip: Rect) {
        let dx = -f64::from(self.scroll);
        let lines = self.visible_lines(clip);
        self.paint_text_layer(painter, lines.clone(), dx);
        if let Some(highlight) = self.highlight {
            let brush = match highlight.kind() {
                HighlightKind::Cursor => &self.colors.cursor,
                HighlightKind::Selection => &self.colors.highlight,
            };
            if dx == 0.0 {
                painter.fill_path(highlight.path(), brush);
            } else {
                let mut path = highlight.path().clone();
                path.apply_affine(peniko::kurbo::Affine::translate(Vec2::new(dx, 0.0)));
                painter.fill_path(&path, brush);
            }
        }
        if let Some(ghost) = self.ghost_offset {
            self.paint_text_layer(painter, lines, f64::from(ghost) + dx);
        }
    }

    fn visible_lines(&self, clip: Rect) -> Range<usize> {
        let data = self.layout.data();
        let first = data
            .lines
            .partition_point(|line| f64::from(line.metrics.bottom) <= clip.y0);
        let last = data
            .lines
            .partition_point(|line| f64::from(line.metrics.top) < clip.y1);
        first..last.max(first)
    }

    fn paint_text_layer(&self, painter: &mut impl Painter<B>, lines: Range<usize>, dx: f64) {
        if lines.is_empty() {
            return;
        }
        let data = self.layout.data();
        let visible = data.lines[lines.start].text_range.start..data.lines[lines.end - 1].text_range.end;
        let spans = self.buffer.spans();
        let offset = Vec2::new(dx, 0.0);

        // Lowest priority first, so higher priorities paint on top.
        for (_, span) in spans.iter().rev() {
            if let SpanStyle::Background(brush) = span.attribute() {
                let range = span.range();
                if range.start < visible.end && range.end > visible.start {
                    for_each_range_rect(self.layout, range.start, range.end, 0.0, |line, rect| {
                        if lines.contains(&line) && rect.width() > 0.0 {
                            painter.fill_rect(rect + offset, brush);
                        }
                    });
                }
            }
        }

        for (_, span) in spans.iter().rev() {
            let attribute = span.attribute();
            if !attribute.is_decoration() {
                continue;
            }
            let range = span.range();
            if range.start >= visible.end || range.end <= visible.start {
                continue;
            }
            let brush = match attribute {
                SpanStyle::Underline(Some(brush)) | SpanStyle::Strikethrough(Some(brush)) => brush,
                _ => &self.colors.text,
            };
            let strikethrough = matches!(attribute, SpanStyle::Strikethrough(_));
            for_each_range_rect(self.layout, range.start, range.end, 0.0, |line, rect| {
                if !lines.contains(&line) || rect.width() <= 0.0 {
                    return;
                }
                let metrics = &data.lines[line].metrics;
                let thickness = f64::from((metrics.ascent / 12.0).max(1.0));
                let y = if strikethrough {
                    f64::from(metrics.baseline - metrics.ascent * 0.3)
                } else {
                    f64::from(metrics.baseline) + thickness
                };
                let bar = Rect::new(rect.x0, y, rect.x1, y + thickness);
                painter.fill_rect(bar + offset, brush);
            });
        }

        let foreground: Vec<(Range<usize>, &B)> = spans
            .iter()
            .filter_map(|(_, span)| match span.attribute() {
                SpanStyle::Foreground(brush) => Some((span.range(), brush)),
                _ => None,
            })
            .collect();
        let brush_at = |offset: usize| {
            foreground
                .iter()
                .find(|(range, _)| range.contains(&offset))
                .map_or(&self.colors.text, |(_, brush)| *brush)
        };
        for index in lines {
            self.paint_line(painter, data, index, dx, &brush_at);
        }
    }

    fn paint_line<'b, P: Painter<B>>(
        &self,
        painter: &mut P,
        data: &LayoutData,
        index: usize,
        dx: f64,
        brush_at: &dyn Fn(usize) -> &'b B,
    ) where
        B: 'b,
    {
        let line = &data.lines[index];
        let baseline = f64::from(line.metrics.baseline);
        let text = self.buffer.as_str();
        let origin = |from: f32, to: f32| {
            let a = LayoutData::visual_x(line, from);
            let b = LayoutData::visual_x(line, to);
            Point::new(f64::from(a.min(b)) + dx, baseline)
        };
        let paint = |painter: &mut P, run: TextRun<'b, B>| {
            painter.draw_text(&text[run.range], origin(run.from, run.to), run.brush);
        };
        let mut run: Option<TextRun<'b, B>> = None;
        for item in data.line_items(line) {
            let cluster = match item.kind {
                ItemKind::Cluster(cluster) => &data.clusters[cluster],
                ItemKind::Ellipsis | ItemKind::Hyphen => {
                    if let Some(done) = run.take() {
                        paint(painter, done);
                    }
                    let mark = if item.kind == ItemKind::Ellipsis {
                        ELLIPSIS
                    } else {
                        HYPHEN
                    };
                    let brush = brush_at(item.text_range.start.saturating_sub(1));
                    painter.draw_text(mark, origin(item.x, item.x + item.advance), brush);
                    continue;
                }
            };
            if cluster.kind == ClusterKind::Newline {
                if let Some(done) = run.take() {
                    paint(painter, done);
                }
                continue;
            }
            let brush = brush_at(cluster.start);
            if let Some(current) = run
                .as_mut()
                .filter(|run| run.brush == brush && run.range.end == cluster.start)
            {
                current.range.end = cluster.end;
                current.to = item.x + item.advance;
                continue;
            }
            let next = TextRun {
                range: cluster.start..cluster.end,
                from: item.x,
                to: item.x + item.advance,
                brush,
            };
            if let Some(done) = run.replace(next) {
                paint(painter, done);
            }
        }
        if let Some(done) = run {
            paint(painter, done);
        }
    }
}

/// Consecutive clusters sharing a brush.
struct TextRun<'b, B> {
    range: Range<usize>,
    /// Logical start and end on the line.
    from: f32,
    to: f32,
    brush: &'b B,
}

// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layouts of text into lines, and geometry queries on them.
//!
//! There are three kinds of layout, picked by the [`LayoutContext`]:
//!
//! - [`LayoutKind::Boring`]: a single unstyled left-to-right line whose
//!   measurement is cached across rebuilds.
//! - [`LayoutKind::Static`]: immutable multi-line text.
//! - [`LayoutKind::Dynamic`]: editable text, which is reflowed around each
//!   edit instead of being rebuilt from scratch.
//!
//! All kinds share one line table, so queries behave the same regardless of
//! the kind.

mod alignment;
mod analysis;
mod builder;
mod line_break;
mod truncate;

use core::ops::Range;

use crate::config::Truncation;
use crate::measure::FontMetrics;

pub use builder::{BoringMetrics, LayoutContext, LayoutRequest};

/// The kind of a [`Layout`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// Single unstyled line with cached metrics.
    Boring,
    /// Immutable multi-line text.
    Static,
    /// Editable text, reflowed incrementally.
    Dynamic,
}

/// Base direction of a paragraph.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Left to right.
    #[default]
    Ltr,
    /// Right to left.
    Rtl,
}

/// Why a line ended.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BreakReason {
    /// End of the text.
    #[default]
    None,
    /// At a line break opportunity.
    Regular,
    /// After a newline.
    Explicit,
    /// Inside a word that was wider than the line.
    Emergency,
}

/// The part of a line replaced by an ellipsis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ellipsis {
    /// First hidden byte.
    pub start: usize,
    /// End of the hidden bytes.
    pub end: usize,
    /// Advance of the ellipsis glyph.
    pub advance: f32,
}

impl Ellipsis {
    /// The hidden byte range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Number of hidden bytes.
    pub fn count(&self) -> usize {
        self.end - self.start
    }
}

/// Metrics of a laid out line.
///
/// Vertical positions are absolute within the layout; `offset` is the
/// horizontal position of the line box after alignment.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LineMetrics {
    /// Space reserved above the baseline.
    pub ascent: f32,
    /// Space reserved below the baseline, before line spacing.
    pub descent: f32,
    /// Top of the line box.
    pub top: f32,
    /// Bottom of the line box, including line spacing.
    pub bottom: f32,
    /// Position of the baseline.
    pub baseline: f32,
    /// Horizontal offset from alignment.
    pub offset: f32,
    /// Full advance of the line, including trailing whitespace.
    pub advance: f32,
    /// Advance of the trailing whitespace.
    pub trailing_whitespace: f32,
}

impl LineMetrics {
    /// Advance of the visible content, without trailing whitespace.
    pub fn width(&self) -> f32 {
        self.advance - self.trailing_whitespace
    }

    /// Height of the line box.
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ClusterKind {
    Text,
    Whitespace,
    Newline,
}

/// A grapheme cluster with its cached advance.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ClusterData {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) advance: f32,
    pub(crate) kind: ClusterKind,
    /// A line may be broken after this cluster.
    pub(crate) break_after: bool,
}

impl ClusterData {
    pub(crate) fn is_text(&self) -> bool {
        self.kind == ClusterKind::Text
    }

    fn shifted(&self, delta: isize) -> Self {
        Self {
            start: shift(self.start, delta),
            end: shift(self.end, delta),
            ..self.clone()
        }
    }
}

pub(crate) fn shift(offset: usize, delta: isize) -> usize {
    (offset as isize + delta) as usize
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct LineData {
    pub(crate) text_range: Range<usize>,
    pub(crate) cluster_range: Range<usize>,
    pub(crate) break_reason: BreakReason,
    pub(crate) direction: Direction,
    pub(crate) hyphenated: bool,
    pub(crate) ellipsis: Option<Ellipsis>,
    pub(crate) metrics: LineMetrics,
}

impl LineData {
    fn shifted(&self, text_delta: isize, cluster_delta: isize) -> Self {
        Self {
            text_range: shift(self.text_range.start, text_delta)..shift(self.text_range.end, text_delta),
            cluster_range: shift(self.cluster_range.start, cluster_delta)
                ..shift(self.cluster_range.end, cluster_delta),
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ItemKind {
    Cluster(usize),
    Ellipsis,
    Hyphen,
}

/// A visual item of a line, in logical order.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct LineItem {
    pub(crate) kind: ItemKind,
    pub(crate) text_range: Range<usize>,
    /// Logical position from the start of the line.
    pub(crate) x: f32,
    pub(crate) advance: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct LayoutData {
    pub(crate) text_len: usize,
    pub(crate) clusters: Vec<ClusterData>,
    pub(crate) lines: Vec<LineData>,
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) font: FontMetrics,
    pub(crate) hyphen_advance: f32,
    pub(crate) truncation: Truncation,
}

impl LayoutData {
    pub(crate) fn line_index_for_offset(&self, offset: usize) -> usize {
        self.lines
            .partition_point(|line| line.text_range.start <= offset)
            .saturating_sub(1)
    }

    pub(crate) fn line_index_for_vertical(&self, y: f32) -> usize {
        self.lines
            .partition_point(|line| line.metrics.bottom <= y)
            .min(self.lines.len().saturating_sub(1))
    }

    pub(crate) fn line_items(&self, line: &LineData) -> Vec<LineItem> {
        let mut items = Vec::with_capacity(line.cluster_range.len() + 1);
        let mut x = 0.0;
        let mut ellipsis_done = false;
        for index in line.cluster_range.clone() {
            let cluster = &self.clusters[index];
            if let Some(ellipsis) = line.ellipsis {
                if cluster.start >= ellipsis.start && cluster.end <= ellipsis.end {
                    if !ellipsis_done {
                        items.push(LineItem {
                            kind: ItemKind::Ellipsis,
                            text_range: ellipsis.range(),
                            x,
                            advance: ellipsis.advance,
                        });
                        x += ellipsis.advance;
                        ellipsis_done = true;
                    }
                    continue;
                }
            }
            items.push(LineItem {
                kind: ItemKind::Cluster(index),
                text_range: cluster.start..cluster.end,
                x,
                advance: cluster.advance,
            });
            x += cluster.advance;
        }
        if let (Some(ellipsis), false) = (line.ellipsis, ellipsis_done) {
            items.push(LineItem {
                kind: ItemKind::Ellipsis,
                text_range: ellipsis.range(),
                x,
                advance: ellipsis.advance,
            });
            x += ellipsis.advance;
        }
        if line.hyphenated {
            let end = line.text_range.end;
            items.push(LineItem {
                kind: ItemKind::Hyphen,
                text_range: end..end,
                x,
                advance: self.hyphen_advance,
            });
        }
        items
    }

    /// Converts a logical position on a line to a visual x coordinate.
    pub(crate) fn visual_x(line: &LineData, logical: f32) -> f32 {
        match line.direction {
            Direction::Ltr => line.metrics.offset + logical,
            Direction::Rtl => line.metrics.offset + line.metrics.advance - logical,
        }
    }

    pub(crate) fn logical_x(line: &LineData, x: f32) -> f32 {
        match line.direction {
            Direction::Ltr => x - line.metrics.offset,
            Direction::Rtl => line.metrics.offset + line.metrics.advance - x,
        }
    }

    /// Logical position of `offset` on line `index`.
    ///
    /// Offsets inside a cluster resolve to its start, offsets hidden by an
    /// ellipsis resolve to the ellipsis.
    pub(crate) fn logical_in_line(&self, index: usize, offset: usize) -> f32 {
        let line = &self.lines[index];
        let items = self.line_items(line);
        for item in &items {
            if offset <= item.text_range.start || offset < item.text_range.end {
                return item.x;
            }
        }
        items
            .iter()
            .filter(|item| item.kind != ItemKind::Hyphen)
            .map(|item| item.x + item.advance)
            .next_back()
            .unwrap_or(0.0)
    }

    pub(crate) fn horizontal_in_line(&self, index: usize, offset: usize) -> f32 {
        let line = &self.lines[index];
        Self::visual_x(line, self.logical_in_line(index, offset))
    }

    /// The offset on line `index` closest to the visual position `x`.
    pub(crate) fn offset_in_line(&self, index: usize, x: f32) -> usize {
        let line = &self.lines[index];
        let target = Self::logical_x(line, x);
        let mut last = line.text_range.start;
        for item in self.line_items(line) {
            match item.kind {
                ItemKind::Hyphen => continue,
                ItemKind::Cluster(cluster) if self.clusters[cluster].kind == ClusterKind::Newline => {
                    return item.text_range.start;
                }
                _ => {}
            }
            if target < item.x + item.advance * 0.5 {
                return item.text_range.start;
            }
            last = item.text_range.end;
        }
        last
    }

    /// Visual horizontal extent of line `index`.
    pub(crate) fn line_extent(&self, index: usize) -> (f32, f32) {
        let metrics = &self.lines[index].metrics;
        (metrics.offset, metrics.offset + metrics.advance)
    }

    pub(crate) fn full_width(&self) -> f32 {
        self.lines
            .iter()
            .map(|line| line.metrics.width())
            .fold(0.0, f32::max)
    }
}

/// A line of a [`Layout`].
#[derive(Copy, Clone, Debug)]
pub struct Line<'a> {
    data: &'a LineData,
    index: usize,
}

impl<'a> Line<'a> {
    /// Index of the line in the layout.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The byte range of the text on this line.
    pub fn text_range(&self) -> Range<usize> {
        self.data.text_range.clone()
    }

    /// The metrics of the line.
    pub fn metrics(&self) -> &'a LineMetrics {
        &self.data.metrics
    }

    /// Why the line ended.
    pub fn break_reason(&self) -> BreakReason {
        self.data.break_reason
    }

    /// The base direction of the line's paragraph.
    pub fn direction(&self) -> Direction {
        self.data.direction
    }

    /// Whether a hyphen is shown at the end of the line.
    pub fn is_hyphenated(&self) -> bool {
        self.data.hyphenated
    }

    /// The truncated part of the line.
    pub fn ellipsis(&self) -> Option<Ellipsis> {
        self.data.ellipsis
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BoringLayout {
    pub(crate) data: LayoutData,
    pub(crate) metrics: BoringMetrics,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct StaticLayout {
    pub(crate) data: LayoutData,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DynamicLayout {
    pub(crate) data: LayoutData,
    /// Lines before truncation, reused by reflows.
    pub(crate) source_lines: Vec<LineData>,
    pub(crate) config: crate::TextConfig,
    pub(crate) reflowed: Range<usize>,
}

/// Text broken into lines for a given width.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout(pub(crate) LayoutInner);

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum LayoutInner {
    Boring(BoringLayout),
    Static(StaticLayout),
    Dynamic(DynamicLayout),
}

impl Default for Layout {
    /// An empty layout with a single empty line.
    fn default() -> Self {
        Self(LayoutInner::Static(StaticLayout {
            data: LayoutData {
                lines: vec![LineData::default()],
                ..Default::default()
            },
        }))
    }
}

impl Layout {
    pub(crate) fn data(&self) -> &LayoutData {
        match &self.0 {
            LayoutInner::Boring(layout) => &layout.data,
            LayoutInner::Static(layout) => &layout.data,
            LayoutInner::Dynamic(layout) => &layout.data,
        }
    }

    /// The kind of this layout.
    pub fn kind(&self) -> LayoutKind {
        match &self.0 {
            LayoutInner::Boring(_) => LayoutKind::Boring,
            LayoutInner::Static(_) => LayoutKind::Static,
            LayoutInner::Dynamic(_) => LayoutKind::Dynamic,
        }
    }

    /// The cached single-line metrics of a boring layout.
    pub fn boring_metrics(&self) -> Option<&BoringMetrics> {
        match &self.0 {
            LayoutInner::Boring(layout) => Some(&layout.metrics),
            _ => None,
        }
    }

    /// The range of lines that were broken again by the last reflow of a
    /// dynamic layout.
    pub fn reflowed_lines(&self) -> Option<Range<usize>> {
        match &self.0 {
            LayoutInner::Dynamic(layout) => Some(layout.reflowed.clone()),
            _ => None,
        }
    }

    /// Length of the text this layout was built for.
    pub fn text_len(&self) -> usize {
        self.data().text_len
    }

    /// The width lines were broken at. Infinite when unbounded.
    pub fn width(&self) -> f32 {
        self.data().width
    }

    /// Width of the widest line, without trailing whitespace.
    pub fn full_width(&self) -> f32 {
        self.data().full_width()
    }

    /// Total height of all lines.
    pub fn height(&self) -> f32 {
        self.data().height
    }

    /// The truncation the layout was built with.
    pub fn truncation(&self) -> Truncation {
        self.data().truncation
    }

    /// The font metrics the layout was built with.
    pub fn font_metrics(&self) -> FontMetrics {
        self.data().font
    }

    /// Number of lines. Never zero.
    pub fn line_count(&self) -> usize {
        self.data().lines.len()
    }

    /// The line at `index`.
    pub fn line(&self, index: usize) -> Option<Line<'_>> {
        self.data()
            .lines
            .get(index)
            .map(|data| Line { data, index })
    }

    /// All lines, top to bottom.
    pub fn lines(&self) -> impl Iterator<Item = Line<'_>> + '_ {
        self.data()
            .lines
            .iter()
            .enumerate()
            .map(|(index, data)| Line { data, index })
    }

    /// The line showing `offset`. An offset at a soft line break belongs to
    /// the following line.
    pub fn line_for_offset(&self, offset: usize) -> usize {
        self.data().line_index_for_offset(offset)
    }

    /// The line at vertical position `y`, clamped to the first and last line.
    pub fn line_for_vertical(&self, y: f32) -> usize {
        self.data().line_index_for_vertical(y)
    }

    /// Top of line `line`.
    pub fn line_top(&self, line: usize) -> f32 {
        self.metrics(line).top
    }

    /// Bottom of line `line`.
    pub fn line_bottom(&self, line: usize) -> f32 {
        self.metrics(line).bottom
    }

    /// Baseline of line `line`.
    pub fn line_baseline(&self, line: usize) -> f32 {
        self.metrics(line).baseline
    }

    /// Distance from the baseline to the bottom of line `line`.
    pub fn line_descent(&self, line: usize) -> f32 {
        let metrics = self.metrics(line);
        metrics.bottom - metrics.baseline
    }

    /// Width of line `line`, without trailing whitespace.
    pub fn line_width(&self, line: usize) -> f32 {
        self.metrics(line).width()
    }

    /// The hidden part of line `line`.
    pub fn ellipsis(&self, line: usize) -> Option<Ellipsis> {
        self.data().lines.get(line).and_then(|line| line.ellipsis)
    }

    /// Bottom of the first `count` lines.
    pub fn height_for_lines(&self, count: usize) -> f32 {
        match count.min(self.line_count()) {
            0 => 0.0,
            n => self.metrics(n - 1).bottom,
        }
    }

    fn metrics(&self, line: usize) -> LineMetrics {
        self.data()
            .lines
            .get(line)
            .map(|line| line.metrics)
            .unwrap_or_default()
    }

    /// Horizontal position of the caret before `offset`.
    pub fn primary_horizontal(&self, offset: usize) -> f32 {
        let data = self.data();
        let offset = offset.min(data.text_len);
        data.horizontal_in_line(data.line_index_for_offset(offset), offset)
    }

    /// Horizontal position of `offset`, measured on line `line`.
    ///
    /// Unlike [`primary_horizontal`](Self::primary_horizontal) this allows
    /// asking for the end of a line that ended at a soft break.
    pub fn horizontal_in_line(&self, line: usize, offset: usize) -> f32 {
        let line = line.min(self.line_count() - 1);
        self.data().horizontal_in_line(line, offset)
    }

    /// The offset on `line` closest to `x`.
    pub fn offset_for_horizontal(&self, line: usize, x: f32) -> usize {
        let line = line.min(self.line_count() - 1);
        self.data().offset_in_line(line, x)
    }

    /// The offset closest to the point `(x, y)`.
    pub fn hit_test(&self, x: f32, y: f32) -> usize {
        self.offset_for_horizontal(self.line_for_vertical(y), x)
    }

    /// Visual left and right edge of line `line`, including trailing
    /// whitespace.
    pub fn line_extent(&self, line: usize) -> (f32, f32) {
        let line = line.min(self.line_count() - 1);
        self.data().line_extent(line)
    }
}

// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Building and reflowing layouts.

use core::ops::Range;

use spanned_text::Edit;
use tracing::{debug, trace};

use super::alignment::align;
use super::analysis::{analyze, has_rtl, paragraph_direction};
use super::line_break::break_paragraph;
use super::truncate::truncate;
use super::{
    BoringLayout, BreakReason, ClusterData, ClusterKind, Direction, DynamicLayout, Layout,
    LayoutData, LayoutInner, LayoutKind, LineData, StaticLayout,
};
use crate::config::{TextConfig, Truncation};
use crate::measure::{sanitize, FontMetrics, Measure};

const ELLIPSIS: &str = "\u{2026}";
const HYPHEN: &str = "-";

/// What to lay out.
#[derive(Copy, Clone, Debug)]
pub struct LayoutRequest<'a> {
    /// The text.
    pub text: &'a str,
    /// Available width, infinite when unbounded.
    pub width: f32,
    /// The text carries style spans.
    pub has_spans: bool,
    /// The text can be selected.
    pub selectable: bool,
    /// The text can be edited.
    pub editable: bool,
}

impl<'a> LayoutRequest<'a> {
    /// A request for plain, read-only text.
    pub fn plain(text: &'a str, width: f32) -> Self {
        Self {
            text,
            width,
            has_spans: false,
            selectable: false,
            editable: false,
        }
    }
}

/// Measurements of a single unstyled line, reused across rebuilds.
#[derive(Clone, Debug, PartialEq)]
pub struct BoringMetrics {
    width: f32,
    font: FontMetrics,
    clusters: Vec<ClusterData>,
}

impl BoringMetrics {
    /// Advance of the whole line.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// The font metrics.
    pub fn font(&self) -> FontMetrics {
        self.font
    }
}

#[derive(Clone, Debug)]
struct BoringCache {
    text: String,
    config: TextConfig,
    metrics: BoringMetrics,
}

/// Shared scratch space and caches for building layouts.
///
/// One context can serve any number of engines; it remembers the
/// measurements of the last boring line it saw.
#[derive(Debug, Default)]
pub struct LayoutContext {
    boring: Option<BoringCache>,
    boring_hits: u64,
}

impl LayoutContext {
    /// Create a context with empty caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// How often cached boring metrics were reused.
    pub fn boring_cache_hits(&self) -> u64 {
        self.boring_hits
    }

    /// Forget cached measurements, e.g. after the measurer changed.
    pub fn clear_cache(&mut self) {
        self.boring = None;
    }

    /// Measurements of `text` as a single unstyled left-to-right line, or
    /// `None` if it isn't one.
    pub fn boring_metrics(
        &mut self,
        text: &str,
        config: &TextConfig,
        measure: &dyn Measure,
    ) -> Option<BoringMetrics> {
        let font = measure.font_metrics().sanitized();
        if let Some(cache) = &self.boring {
            if cache.text == text && cache.config == *config && cache.metrics.font == font {
                self.boring_hits += 1;
                trace!(len = text.len(), "reusing boring metrics");
                return Some(cache.metrics.clone());
            }
        }
        if (!config.single_line && text.contains('\n')) || has_rtl(text) {
            return None;
        }
        let clusters = analyze(text, 0..text.len(), measure, config.single_line);
        let metrics = BoringMetrics {
            width: clusters.iter().map(|cluster| cluster.advance).sum(),
            font,
            clusters,
        };
        self.boring = Some(BoringCache {
            text: text.to_owned(),
            config: config.clone(),
            metrics: metrics.clone(),
        });
        Some(metrics)
    }

    /// The layout kind [`build`](Self::build) would produce.
    pub fn choose_kind(
        &mut self,
        request: &LayoutRequest<'_>,
        config: &TextConfig,
        measure: &dyn Measure,
    ) -> LayoutKind {
        self.choose(request, config, measure).0
    }

    fn choose(
        &mut self,
        request: &LayoutRequest<'_>,
        config: &TextConfig,
        measure: &dyn Measure,
    ) -> (LayoutKind, Option<BoringMetrics>) {
        if request.editable {
            return (LayoutKind::Dynamic, None);
        }
        if request.has_spans || request.selectable {
            return (LayoutKind::Static, None);
        }
        match self.boring_metrics(request.text, config, measure) {
            Some(metrics)
                if metrics.width <= request.width
                    || (config.visible_line_limit() == Some(1)
                        && config.truncation != Truncation::None) =>
            {
                (LayoutKind::Boring, Some(metrics))
            }
            _ => (LayoutKind::Static, None),
        }
    }

    /// Build a layout from scratch.
    pub fn build(
        &mut self,
        request: &LayoutRequest<'_>,
        config: &TextConfig,
        measure: &dyn Measure,
    ) -> Layout {
        let (kind, boring) = self.choose(request, config, measure);
        let text = request.text;
        let width = request.width;
        let layout = match (kind, boring) {
            (LayoutKind::Boring, Some(metrics)) => {
                let clusters = metrics.clusters.clone();
                let lines = vec![make_line(
                    text,
                    &clusters,
                    0..clusters.len(),
                    BreakReason::None,
                    false,
                    Direction::Ltr,
                    0.0,
                )];
                let data = finish(text, clusters, lines, config, width, measure);
                Layout(LayoutInner::Boring(BoringLayout { data, metrics }))
            }
            (LayoutKind::Dynamic, _) => {
                let clusters = analyze(text, 0..text.len(), measure, config.single_line);
                let hyphen = sanitize(measure.advance(HYPHEN), "hyphen");
                let source_lines = break_region(
                    text,
                    &clusters,
                    0..clusters.len(),
                    text.len(),
                    config,
                    width,
                    hyphen,
                );
                let reflowed = 0..source_lines.len();
                let data = finish(text, clusters, source_lines.clone(), config, width, measure);
                Layout(LayoutInner::Dynamic(DynamicLayout {
                    data,
                    source_lines,
                    config: config.clone(),
                    reflowed,
                }))
            }
            _ => {
                let clusters = analyze(text, 0..text.len(), measure, config.single_line);
                let hyphen = sanitize(measure.advance(HYPHEN), "hyphen");
                let lines = break_region(
                    text,
                    &clusters,
                    0..clusters.len(),
                    text.len(),
                    config,
                    width,
                    hyphen,
                );
                let data = finish(text, clusters, lines, config, width, measure);
                Layout(LayoutInner::Static(StaticLayout { data }))
            }
        };
        debug!(
            kind = ?layout.kind(),
            lines = layout.line_count(),
            width,
            "built layout"
        );
        layout
    }

    /// Update `previous` for an edit described by `hint`.
    ///
    /// Dynamic layouts only break the paragraphs touched by the edit again.
    /// Anything else, or a layout built with different options, is rebuilt.
    pub fn reflow(
        &mut self,
        previous: &Layout,
        hint: Edit,
        request: &LayoutRequest<'_>,
        config: &TextConfig,
        measure: &dyn Measure,
    ) -> Layout {
        let text = request.text;
        let LayoutInner::Dynamic(prev) = &previous.0 else {
            return self.build(request, config, measure);
        };
        let consistent = prev.data.text_len as isize + hint.delta() == text.len() as isize
            && hint.new_end() <= text.len();
        if !request.editable
            || !consistent
            || config.single_line
            || prev.config != *config
            || prev.data.width != request.width
            || prev.data.font != measure.font_metrics().sanitized()
        {
            debug!(consistent, "reflow falls back to a full build");
            return self.build(request, config, measure);
        }

        let len = text.len();
        let para_start = text[..hint.start]
            .rfind('\n')
            .map_or(0, |index| index + 1);
        let search_from = hint.new_end();
        let para_end = text[search_from..]
            .find('\n')
            .map_or(len, |index| search_from + index + 1);
        let delta = hint.delta();
        let old_para_end = (para_end as isize - delta) as usize;
        let reaches_end = para_end == len;

        let old_clusters = &prev.data.clusters;
        let prefix_clusters = old_clusters.partition_point(|cluster| cluster.start < para_start);
        let suffix_clusters = if reaches_end {
            old_clusters.len()
        } else {
            old_clusters.partition_point(|cluster| cluster.start < old_para_end)
        };
        let region = analyze(text, para_start..para_end, measure, false);
        let region_clusters = prefix_clusters..prefix_clusters + region.len();
        let cluster_delta = region_clusters.end as isize - suffix_clusters as isize;

        let mut clusters = Vec::with_capacity(prefix_clusters + region.len() + old_clusters.len() - suffix_clusters);
        clusters.extend_from_slice(&old_clusters[..prefix_clusters]);
        clusters.extend(region);
        clusters.extend(
            old_clusters[suffix_clusters..]
                .iter()
                .map(|cluster| cluster.shifted(delta)),
        );
        // The prefix ends with a newline, which only breaks when text follows.
        if prefix_clusters > 0 {
            let newline = &mut clusters[prefix_clusters - 1];
            newline.break_after = newline.end != len;
        }

        let old_lines = &prev.source_lines;
        let prefix_lines = old_lines.partition_point(|line| line.text_range.start < para_start);
        let suffix_lines = if reaches_end {
            old_lines.len()
        } else {
            old_lines.partition_point(|line| line.text_range.start < old_para_end)
        };
        let hyphen = sanitize(measure.advance(HYPHEN), "hyphen");
        let region_lines = break_region(
            text,
            &clusters,
            region_clusters,
            para_end,
            config,
            request.width,
            hyphen,
        );
        let reflowed = prefix_lines..prefix_lines + region_lines.len();
        let mut source_lines = Vec::with_capacity(old_lines.len() + region_lines.len());
        source_lines.extend_from_slice(&old_lines[..prefix_lines]);
        source_lines.extend(region_lines);
        source_lines.extend(
            old_lines[suffix_lines..]
                .iter()
                .map(|line| line.shifted(delta, cluster_delta)),
        );
        trace!(
            paragraphs = ?(para_start..para_end),
            lines = ?reflowed,
            "reflowed dynamic layout"
        );
        let data = finish(
            text,
            clusters,
            source_lines.clone(),
            config,
            request.width,
            measure,
        );
        Layout(LayoutInner::Dynamic(DynamicLayout {
            data,
            source_lines,
            config: config.clone(),
            reflowed,
        }))
    }

    /// The width `text` needs to avoid any soft line breaks.
    ///
    /// For text that could use a boring layout this is the smaller of the
    /// single line advance and the widest paragraph.
    pub fn desired_width(&mut self, text: &str, config: &TextConfig, measure: &dyn Measure) -> f32 {
        let boring = self.boring_metrics(text, config, measure).map(|metrics| metrics.width);
        let clusters = analyze(text, 0..text.len(), measure, config.single_line);
        let mut widest: f32 = 0.0;
        let mut advance = 0.0;
        let mut content = 0.0;
        for cluster in &clusters {
            advance += cluster.advance;
            if cluster.is_text() {
                content = advance;
            }
            if cluster.kind == ClusterKind::Newline {
                widest = widest.max(content);
                advance = 0.0;
                content = 0.0;
            }
        }
        widest = widest.max(content);
        match boring {
            Some(boring) => boring.min(widest),
            None => widest,
        }
    }
}

fn break_width(config: &TextConfig, width: f32) -> f32 {
    if config.single_line || config.truncation == Truncation::Marquee {
        f32::INFINITY
    } else {
        width
    }
}

/// Breaks the paragraphs in `range` of `clusters` into lines.
///
/// `text_end` is the byte end of the region; an empty line is added when the
/// region ends the text after a newline or the text is empty.
fn break_region(
    text: &str,
    clusters: &[ClusterData],
    range: Range<usize>,
    text_end: usize,
    config: &TextConfig,
    width: f32,
    hyphen_advance: f32,
) -> Vec<LineData> {
    let max_advance = break_width(config, width);
    let hyphen = config.hyphenation.then_some(hyphen_advance);
    let mut lines = Vec::new();
    let mut start = range.start;
    while start < range.end {
        let mut end = start + 1;
        while end < range.end && clusters[end - 1].kind != ClusterKind::Newline {
            end += 1;
        }
        let paragraph = &clusters[start..end];
        let direction = paragraph_direction(&text[paragraph[0].start..paragraph[paragraph.len() - 1].end]);
        for line in break_paragraph(paragraph, max_advance, config.break_strategy, hyphen) {
            lines.push(make_line(
                text,
                clusters,
                start + line.clusters.start..start + line.clusters.end,
                line.reason,
                line.hyphenated,
                direction,
                hyphen_advance,
            ));
        }
        start = end;
    }
    let ends_paragraph = range.is_empty()
        || clusters[range.end - 1].kind == ClusterKind::Newline;
    if text_end == text.len() && ends_paragraph {
        let direction = match text_end.checked_sub(1) {
            Some(newline) => {
                let start = text[..newline].rfind('\n').map_or(0, |index| index + 1);
                paragraph_direction(&text[start..text_end])
            }
            None => Direction::Ltr,
        };
        lines.push(LineData {
            text_range: text_end..text_end,
            cluster_range: range.end..range.end,
            direction,
            ..Default::default()
        });
    }
    lines
}

fn make_line(
    text: &str,
    clusters: &[ClusterData],
    range: Range<usize>,
    break_reason: BreakReason,
    hyphenated: bool,
    direction: Direction,
    hyphen_advance: f32,
) -> LineData {
    let line_clusters = &clusters[range.clone()];
    let text_range = match (line_clusters.first(), line_clusters.last()) {
        (Some(first), Some(last)) => first.start..last.end,
        _ => text.len()..text.len(),
    };
    let mut line = LineData {
        text_range,
        cluster_range: range,
        break_reason,
        direction,
        hyphenated,
        ..Default::default()
    };
    line.metrics.advance = line_clusters.iter().map(|cluster| cluster.advance).sum();
    line.metrics.trailing_whitespace = line_clusters
        .iter()
        .rev()
        .take_while(|cluster| !cluster.is_text())
        .map(|cluster| cluster.advance)
        .sum();
    if hyphenated {
        line.metrics.advance += hyphen_advance;
    }
    line
}

/// Stacks lines vertically and returns the total height.
///
/// Line spacing is applied between lines, not after the last one. With font
/// padding, the first line uses the font's top and the last line its bottom.
fn place_lines(lines: &mut [LineData], font: FontMetrics, config: &TextConfig) -> f32 {
    let count = lines.len();
    let mut y = 0.0;
    for (index, line) in lines.iter_mut().enumerate() {
        let first = index == 0;
        let last = index + 1 == count;
        let above = if first && config.include_font_padding {
            font.top.max(font.ascent)
        } else {
            font.ascent
        };
        let below = if last && config.include_font_padding {
            font.bottom.max(font.descent)
        } else {
            font.descent
        };
        let natural = above + below;
        let height = if last {
            natural
        } else {
            (natural * config.line_spacing_multiplier + config.line_spacing_extra).max(0.0)
        };
        let metrics = &mut line.metrics;
        metrics.ascent = above;
        metrics.descent = below;
        metrics.top = y;
        metrics.baseline = y + above;
        metrics.bottom = y + height;
        y += height;
    }
    y
}

fn finish(
    text: &str,
    clusters: Vec<ClusterData>,
    mut lines: Vec<LineData>,
    config: &TextConfig,
    width: f32,
    measure: &dyn Measure,
) -> LayoutData {
    let font = measure.font_metrics().sanitized();
    let ellipsis_advance = sanitize(measure.advance(ELLIPSIS), "ellipsis");
    let hyphen_advance = sanitize(measure.advance(HYPHEN), "hyphen");
    truncate(
        &mut lines,
        &clusters,
        config.truncation,
        config.visible_line_limit(),
        width,
        ellipsis_advance,
    );
    let height = place_lines(&mut lines, font, config);
    align(&mut lines, width, config.alignment);
    LayoutData {
        text_len: text.len(),
        clusters,
        lines,
        width,
        height,
        font,
        hyphen_advance,
        truncation: config.truncation,
    }
}

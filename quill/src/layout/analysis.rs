// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Segmentation of text into measured grapheme clusters.

use core::ops::Range;

use icu_segmenter::options::LineBreakOptions;
use icu_segmenter::{GraphemeClusterSegmenter, LineSegmenter};
use unicode_bidi::BidiInfo;

use super::{ClusterData, ClusterKind, Direction};
use crate::measure::{sanitize, Measure};

fn is_breaking_whitespace(c: char) -> bool {
    c.is_whitespace() && !matches!(c, '\u{A0}' | '\u{202F}' | '\u{2007}')
}

/// Splits `text[range]` into grapheme clusters and measures each one.
///
/// `range` must start at a paragraph boundary. With `single_line`, newlines
/// are measured as spaces and never force a break.
pub(crate) fn analyze(
    text: &str,
    range: Range<usize>,
    measure: &dyn Measure,
    single_line: bool,
) -> Vec<ClusterData> {
    let slice = &text[range.clone()];
    if slice.is_empty() {
        return Vec::new();
    }
    let base = range.start;
    let breaks: Vec<usize> = LineSegmenter::new_auto(LineBreakOptions::default())
        .segment_str(slice)
        .collect();
    let mut breaks = breaks.into_iter().peekable();
    let space_advance = if single_line {
        sanitize(measure.advance(" "), "advance")
    } else {
        0.0
    };

    let boundaries: Vec<usize> = GraphemeClusterSegmenter::new().segment_str(slice).collect();
    let mut clusters = Vec::with_capacity(boundaries.len());
    for pair in boundaries.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let cluster = &slice[start..end];
        let is_newline = cluster.ends_with('\n');
        let (kind, advance) = if is_newline && single_line {
            (ClusterKind::Whitespace, space_advance)
        } else if is_newline {
            (ClusterKind::Newline, 0.0)
        } else if cluster.chars().all(is_breaking_whitespace) {
            (ClusterKind::Whitespace, sanitize(measure.advance(cluster), "advance"))
        } else {
            (ClusterKind::Text, sanitize(measure.advance(cluster), "advance"))
        };
        while breaks.next_if(|b| *b < end).is_some() {}
        let break_after =
            !single_line && breaks.peek() == Some(&end) && base + end != text.len();
        clusters.push(ClusterData {
            start: base + start,
            end: base + end,
            advance,
            kind,
            break_after,
        });
    }
    clusters
}

/// Base direction of a paragraph, from its first strong character.
pub(crate) fn paragraph_direction(text: &str) -> Direction {
    let info = BidiInfo::new(text, None);
    match info.paragraphs.first() {
        Some(paragraph) if paragraph.level.is_rtl() => Direction::Rtl,
        _ => Direction::Ltr,
    }
}

/// Returns `true` if any character of `text` is right-to-left.
pub(crate) fn has_rtl(text: &str) -> bool {
    BidiInfo::new(text, None).has_rtl()
}

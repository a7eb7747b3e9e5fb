// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ellipsizing of overflowing text.

use super::{ClusterData, ClusterKind, Ellipsis, LineData};
use crate::config::Truncation;

/// Limits `lines` to `limit` lines and ellipsizes the last visible line when
/// text was cut or the line is wider than `max_advance`.
///
/// Lines past the limit are merged into the last visible line, so every byte
/// of the text still belongs to exactly one line.
pub(crate) fn truncate(
    lines: &mut Vec<LineData>,
    clusters: &[ClusterData],
    truncation: Truncation,
    limit: Option<usize>,
    max_advance: f32,
    ellipsis_advance: f32,
) {
    if !truncation.is_ellipsis() {
        return;
    }
    let Some(limit) = limit.map(|limit| limit.max(1)) else {
        return;
    };
    let overflowed = lines.len() > limit;
    let Some(last_index) = lines.len().min(limit).checked_sub(1) else {
        return;
    };
    let visible_end = lines[last_index].cluster_range.end;
    if overflowed {
        let tail = lines.split_off(limit);
        if let Some(tail_end) = tail.last() {
            let line = &mut lines[last_index];
            line.text_range.end = tail_end.text_range.end;
            line.cluster_range.end = tail_end.cluster_range.end;
            line.break_reason = tail_end.break_reason;
            line.hyphenated = false;
        }
    }
    let line = &mut lines[last_index];
    if !overflowed && (!max_advance.is_finite() || line.metrics.width() <= max_advance) {
        return;
    }
    ellipsize(
        line,
        clusters,
        truncation,
        visible_end,
        (max_advance - ellipsis_advance).max(0.0),
        ellipsis_advance,
    );
}

fn byte_at(line: &LineData, clusters: &[ClusterData], index: usize) -> usize {
    if index < line.cluster_range.end {
        clusters[index].start
    } else {
        line.text_range.end
    }
}

/// Longest prefix of the line, ending before `limit`, that fits `budget`.
fn fit_prefix(line: &LineData, clusters: &[ClusterData], limit: usize, budget: f32) -> (usize, f32) {
    let mut x = 0.0;
    let mut cut = line.cluster_range.start;
    for (index, cluster) in clusters
        .iter()
        .enumerate()
        .take(limit)
        .skip(line.cluster_range.start)
    {
        if cluster.kind == ClusterKind::Newline || x + cluster.advance > budget {
            break;
        }
        x += cluster.advance;
        cut = index + 1;
    }
    while cut > line.cluster_range.start && !clusters[cut - 1].is_text() {
        cut -= 1;
        x -= clusters[cut].advance;
    }
    (cut, x)
}

/// Longest suffix of the line, starting at or after `floor`, that fits
/// `budget`.
fn fit_suffix(line: &LineData, clusters: &[ClusterData], floor: usize, budget: f32) -> (usize, f32) {
    let mut x = 0.0;
    let mut cut = line.cluster_range.end;
    for index in (floor..line.cluster_range.end).rev() {
        let advance = clusters[index].advance;
        if x + advance > budget {
            break;
        }
        x += advance;
        cut = index;
    }
    (cut, x)
}

fn ellipsize(
    line: &mut LineData,
    clusters: &[ClusterData],
    truncation: Truncation,
    visible_end: usize,
    budget: f32,
    ellipsis_advance: f32,
) {
    let (start, end, kept) = match truncation {
        Truncation::Start => {
            let (cut, x) = fit_suffix(line, clusters, line.cluster_range.start, budget);
            (line.text_range.start, byte_at(line, clusters, cut), x)
        }
        Truncation::Middle => {
            let (head, head_x) = fit_prefix(line, clusters, visible_end, budget * 0.5);
            let (tail, tail_x) = fit_suffix(line, clusters, head, budget - head_x);
            (
                byte_at(line, clusters, head),
                byte_at(line, clusters, tail),
                head_x + tail_x,
            )
        }
        _ => {
            let (cut, x) = fit_prefix(line, clusters, visible_end, budget);
            (byte_at(line, clusters, cut), line.text_range.end, x)
        }
    };
    line.ellipsis = Some(Ellipsis {
        start,
        end,
        advance: ellipsis_advance,
    });
    line.metrics.advance = kept + ellipsis_advance;
    line.metrics.trailing_whitespace = 0.0;
}

#[cfg(test)]
mod tests {
    use super::truncate;
    use crate::layout::analysis::analyze;
    use crate::layout::{ClusterData, Ellipsis, LineData};
    use crate::{Monospace, Truncation};

    fn single_line(text: &str) -> (Vec<ClusterData>, Vec<LineData>) {
        let clusters = analyze(text, 0..text.len(), &Monospace::new(10.0), true);
        let mut line = LineData {
            text_range: 0..text.len(),
            cluster_range: 0..clusters.len(),
            ..Default::default()
        };
        line.metrics.advance = clusters.iter().map(|c| c.advance).sum();
        (clusters, vec![line])
    }

    fn ellipsis_of(text: &str, truncation: Truncation, width: f32) -> Option<Ellipsis> {
        let (clusters, mut lines) = single_line(text);
        truncate(&mut lines, &clusters, truncation, Some(1), width, 10.0);
        lines[0].ellipsis
    }

    #[test]
    fn fitting_text_is_untouched() {
        assert_eq!(ellipsis_of("Hello", Truncation::End, 50.0), None);
    }

    #[test]
    fn end_start_and_middle() {
        // "Hello World" is 110 wide; 60 leaves room for 5 characters.
        let end = ellipsis_of("Hello World", Truncation::End, 60.0).unwrap();
        assert_eq!(end.range(), 5..11);
        let start = ellipsis_of("Hello World", Truncation::Start, 60.0).unwrap();
        assert_eq!(start.range(), 0..6);
        let middle = ellipsis_of("Hello World", Truncation::Middle, 60.0).unwrap();
        assert_eq!(middle.range(), 2..8);
    }

    #[test]
    fn trailing_space_is_not_kept_before_the_ellipsis() {
        let end = ellipsis_of("Hello World", Truncation::End, 70.0).unwrap();
        assert_eq!(end.range(), 5..11);
    }

    #[test]
    fn hidden_lines_merge_into_the_last_visible_line() {
        let text = "one\ntwo\nthree";
        let clusters = analyze(text, 0..text.len(), &Monospace::new(10.0), false);
        let line = |text_range: core::ops::Range<usize>, cluster_range: core::ops::Range<usize>| {
            let mut line = LineData {
                text_range,
                cluster_range,
                ..Default::default()
            };
            line.metrics.advance = 30.0;
            line
        };
        let mut lines = vec![line(0..4, 0..4), line(4..8, 4..8), line(8..13, 8..13)];
        truncate(&mut lines, &clusters, Truncation::End, Some(2), 100.0, 10.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].text_range, 4..13);
        assert_eq!(lines[1].ellipsis.map(|e| e.range()), Some(7..13));
        assert_eq!(lines[1].metrics.advance, 40.0);
    }

    #[test]
    fn cut_lines_are_ellipsized_without_a_width() {
        let text = "a\nb\nc";
        let clusters = analyze(text, 0..text.len(), &Monospace::new(10.0), false);
        let mut lines = vec![
            LineData {
                text_range: 0..2,
                cluster_range: 0..2,
                ..Default::default()
            },
            LineData {
                text_range: 2..4,
                cluster_range: 2..4,
                ..Default::default()
            },
            LineData {
                text_range: 4..5,
                cluster_range: 4..5,
                ..Default::default()
            },
        ];
        truncate(&mut lines, &clusters, Truncation::End, Some(2), f32::INFINITY, 10.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].text_range, 2..5);
        assert_eq!(lines[1].ellipsis.map(|e| e.range()), Some(3..5));
        assert_eq!(lines[1].metrics.advance, 20.0);
    }

    #[test]
    fn marquee_and_none_never_ellipsize() {
        assert_eq!(ellipsis_of("Hello World", Truncation::None, 60.0), None);
        assert_eq!(ellipsis_of("Hello World", Truncation::Marquee, 60.0), None);
    }
}

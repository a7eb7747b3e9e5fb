// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Breaking a paragraph into lines.

use core::ops::Range;

use super::{BreakReason, ClusterData, ClusterKind};
use crate::config::BreakStrategy;

/// A line produced by the breaker, in paragraph-relative cluster indices.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BrokenLine {
    pub(crate) clusters: Range<usize>,
    pub(crate) reason: BreakReason,
    pub(crate) hyphenated: bool,
}

struct Paragraph<'a> {
    clusters: &'a [ClusterData],
    /// `prefix[i]` is the advance of clusters `0..i`.
    prefix: Vec<f32>,
    /// `trim[i]` is the end of the last text cluster at or before `i`.
    trim: Vec<usize>,
}

impl<'a> Paragraph<'a> {
    fn new(clusters: &'a [ClusterData]) -> Self {
        let mut prefix = Vec::with_capacity(clusters.len() + 1);
        let mut trim = Vec::with_capacity(clusters.len() + 1);
        prefix.push(0.0);
        trim.push(0);
        for (index, cluster) in clusters.iter().enumerate() {
            prefix.push(prefix[index] + cluster.advance);
            trim.push(if cluster.is_text() { index + 1 } else { trim[index] });
        }
        Self {
            clusters,
            prefix,
            trim,
        }
    }

    fn advance(&self, start: usize, end: usize) -> f32 {
        self.prefix[end] - self.prefix[start]
    }

    /// Advance without trailing whitespace.
    fn content_width(&self, start: usize, end: usize) -> f32 {
        self.advance(start, self.trim[end].max(start))
    }

    fn final_reason(&self) -> BreakReason {
        match self.clusters.last() {
            Some(cluster) if cluster.kind == ClusterKind::Newline => BreakReason::Explicit,
            _ => BreakReason::None,
        }
    }
}

/// Breaks a paragraph to fit `max_advance`.
///
/// The clusters must not contain a newline except as the last cluster.
/// With `hyphen` set, words broken in an emergency leave room for a hyphen
/// of that advance.
pub(crate) fn break_paragraph(
    clusters: &[ClusterData],
    max_advance: f32,
    strategy: BreakStrategy,
    hyphen: Option<f32>,
) -> Vec<BrokenLine> {
    let paragraph = Paragraph::new(clusters);
    let greedy = break_greedy(&paragraph, max_advance, hyphen);
    if strategy == BreakStrategy::Simple
        || greedy.len() < 2
        || !max_advance.is_finite()
        || greedy.iter().any(|line| line.reason == BreakReason::Emergency)
    {
        return greedy;
    }
    break_optimal(&paragraph, max_advance, strategy, greedy.len()).unwrap_or(greedy)
}

fn break_greedy(paragraph: &Paragraph<'_>, max_advance: f32, hyphen: Option<f32>) -> Vec<BrokenLine> {
    let clusters = paragraph.clusters;
    let mut lines = Vec::new();
    let mut start = 0;
    let mut last_break: Option<usize> = None;
    let mut index = 0;
    while index < clusters.len() {
        let cluster = &clusters[index];
        // Whitespace hangs past the end of the line.
        if !cluster.is_text() {
            if cluster.break_after {
                last_break = Some(index + 1);
            }
            index += 1;
            continue;
        }
        if index > start && paragraph.advance(start, index + 1) > max_advance {
            if let Some(at) = last_break.filter(|at| *at > start) {
                lines.push(BrokenLine {
                    clusters: start..at,
                    reason: BreakReason::Regular,
                    hyphenated: false,
                });
                start = at;
            } else {
                let mut end = index;
                if let Some(hyphen) = hyphen {
                    while end > start + 1 && paragraph.advance(start, end) + hyphen > max_advance {
                        end -= 1;
                    }
                }
                lines.push(BrokenLine {
                    clusters: start..end,
                    reason: BreakReason::Emergency,
                    hyphenated: hyphen.is_some(),
                });
                start = end;
            }
            last_break = None;
            continue;
        }
        if cluster.break_after {
            last_break = Some(index + 1);
        }
        index += 1;
    }
    lines.push(BrokenLine {
        clusters: start..clusters.len(),
        reason: paragraph.final_reason(),
        hyphenated: false,
    });
    lines
}

#[derive(Copy, Clone)]
struct Node {
    cost: f32,
    prev: usize,
}

/// Chooses breaks minimising the squared slack of lines.
///
/// `HighQuality` measures slack against the full width and leaves the last
/// line free, `Balanced` measures every line against the average line width
/// of the greedy result.
fn break_optimal(
    paragraph: &Paragraph<'_>,
    max_advance: f32,
    strategy: BreakStrategy,
    greedy_lines: usize,
) -> Option<Vec<BrokenLine>> {
    let clusters = paragraph.clusters;
    let len = clusters.len();
    let candidates: Vec<usize> = (0..=len)
        .filter(|at| *at == 0 || *at == len || clusters[at - 1].break_after)
        .collect();
    let target = match strategy {
        BreakStrategy::Balanced => {
            (paragraph.content_width(0, len) / greedy_lines as f32).min(max_advance)
        }
        _ => max_advance,
    };
    let line_penalty = max_advance * max_advance;

    let mut nodes: Vec<Option<Node>> = vec![None; candidates.len()];
    nodes[0] = Some(Node {
        cost: 0.0,
        prev: 0,
    });
    for k in 1..candidates.len() {
        let end = candidates[k];
        let is_last = end == len;
        for j in (0..k).rev() {
            let start = candidates[j];
            let width = paragraph.content_width(start, end);
            if width > max_advance {
                break;
            }
            let Some(from) = nodes[j] else {
                continue;
            };
            let slack = target - width;
            let badness = if is_last && strategy == BreakStrategy::HighQuality {
                0.0
            } else {
                slack * slack
            };
            let cost = from.cost + badness + line_penalty;
            if nodes[k].is_none_or(|node| cost < node.cost) {
                nodes[k] = Some(Node { cost, prev: j });
            }
        }
    }

    let mut breaks = vec![candidates.len() - 1];
    let mut k = candidates.len() - 1;
    while k != 0 {
        k = nodes[k]?.prev;
        breaks.push(k);
    }
    breaks.reverse();
    let final_reason = paragraph.final_reason();
    Some(
        breaks
            .windows(2)
            .map(|pair| {
                let end = candidates[pair[1]];
                BrokenLine {
                    clusters: candidates[pair[0]]..end,
                    reason: if end == len {
                        final_reason
                    } else {
                        BreakReason::Regular
                    },
                    hyphenated: false,
                }
            })
            .collect(),
    )
}

// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::{Direction, LineData};
use crate::config::Alignment;

/// Positions lines horizontally within `alignment_width`.
///
/// Without a finite width, lines are aligned within the widest line.
pub(crate) fn align(lines: &mut [LineData], alignment_width: f32, alignment: Alignment) {
    let alignment_width = if alignment_width.is_finite() {
        alignment_width
    } else {
        lines
            .iter()
            .map(|line| line.metrics.width())
            .fold(0.0, f32::max)
    };

    for line in lines {
        line.metrics.offset = 0.0;
        let is_rtl = line.direction == Direction::Rtl;
        let free_space = alignment_width - line.metrics.width();

        // Overflowing lines start at the left edge.
        if free_space <= 0.0 {
            continue;
        }

        match (alignment, is_rtl) {
            (Alignment::Left, _) | (Alignment::Start, false) | (Alignment::End, true) => {}
            (Alignment::Right, _) | (Alignment::Start, true) | (Alignment::End, false) => {
                line.metrics.offset = free_space;
            }
            (Alignment::Center, _) => {
                line.metrics.offset = free_space * 0.5;
            }
        }

        if is_rtl {
            // In RTL text, trailing whitespace is on the left. As we hang that whitespace, offset
            // the line to the left.
            line.metrics.offset -= line.metrics.trailing_whitespace;
        }
    }
}

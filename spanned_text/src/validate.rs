// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use crate::Error;

/// Checks that `range` is ordered, inside `text` and on char boundaries.
pub(crate) fn validate_range(text: &str, range: &Range<usize>) -> Result<(), Error> {
    let len = text.len();
    if range.start > range.end {
        return Err(Error::InvalidRange {
            start: range.start,
            end: range.end,
            len,
        });
    }
    if range.end > len {
        return Err(Error::InvalidBounds {
            start: range.start,
            end: range.end,
            len,
        });
    }
    for index in [range.start, range.end] {
        if !text.is_char_boundary(index) {
            return Err(Error::not_on_char_boundary(
                text,
                range.start,
                range.end,
                index,
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_range;
    use crate::Error;

    #[test]
    fn validates_ok_ranges() {
        let t = "Hello!";
        assert!(validate_range(t, &(0..0)).is_ok());
        assert!(validate_range(t, &(0..6)).is_ok());
        assert!(validate_range(t, &(6..6)).is_ok());
    }

    #[test]
    #[expect(
        clippy::reversed_empty_ranges,
        reason = "We want an invalid range for testing."
    )]
    fn rejects_start_greater_than_end() {
        let err = validate_range("Hello!", &(4..3)).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidRange {
                start: 4,
                end: 3,
                len: 6
            }
        );
    }

    #[test]
    fn rejects_out_of_bounds() {
        let err = validate_range("Hello!", &(0..7)).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidBounds {
                start: 0,
                end: 7,
                len: 6
            }
        );
    }

    #[test]
    fn rejects_split_codepoint() {
        // "é" is 2 bytes in UTF-8; index 1 is not a boundary.
        let err = validate_range("éclair", &(0..1)).unwrap_err();
        assert!(matches!(
            err,
            Error::NotOnCharBoundary {
                index: 1,
                char_start: 0,
                char_end: 2,
                ..
            }
        ));
    }
}

//! Time-window derivation.
//!
//! Turns one instant plus a window, or an instant pair plus caller-supplied
//! bounds, into a validated [`TimeRange`]. The builder carries no policy of
//! its own; every limit flows in through [`RangeBounds`].

use serde::Serialize;

use crate::error::{PivotError, Result};
use crate::parse::ParsedTime;

/// A bounded, strictly forward time range.
///
/// Invariant: `duration_seconds = end_epoch_seconds - start_epoch_seconds`
/// and is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start_epoch_seconds: i64,
    pub end_epoch_seconds: i64,
    pub duration_seconds: i64,
}

/// Caller-supplied duration limits for [`explicit_range`].
///
/// The minimum is treated as at least 1 second so a range can never be empty
/// or inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeBounds {
    pub min_seconds: i64,
    pub max_seconds: i64,
}

impl RangeBounds {
    pub const fn new(min_seconds: i64, max_seconds: i64) -> Self {
        Self {
            min_seconds,
            max_seconds,
        }
    }

    /// Bounds with no upper ceiling, for unrestricted searches.
    pub const fn at_least(min_seconds: i64) -> Self {
        Self {
            min_seconds,
            max_seconds: i64::MAX,
        }
    }
}

/// Build a window of exactly `window_seconds` centered on `center`.
///
/// The backward half is `window / 2` rounded down; an odd window allocates
/// the extra second to the forward side.
///
/// # Errors
///
/// Returns [`PivotError::DurationOutOfBounds`] if `window_seconds < 1` or the
/// window would leave the representable epoch range.
///
/// # Examples
///
/// ```
/// use pivot_engine::{centered_window, parse_timestamp};
///
/// let center = parse_timestamp("2025-07-26T00:49:16Z").unwrap();
/// let range = centered_window(&center, 5).unwrap();
/// assert_eq!(range.start_epoch_seconds, 1753490954);
/// assert_eq!(range.end_epoch_seconds, 1753490959);
/// ```
pub fn centered_window(center: &ParsedTime, window_seconds: i64) -> Result<TimeRange> {
    if window_seconds < 1 {
        return Err(PivotError::DurationOutOfBounds(format!(
            "window of {window_seconds}s; the window must be at least 1 second"
        )));
    }
    let backward = window_seconds / 2;
    let forward = window_seconds - backward;
    let start = center.epoch_seconds.checked_sub(backward);
    let end = center.epoch_seconds.checked_add(forward);
    match (start, end) {
        (Some(start), Some(end)) => Ok(TimeRange {
            start_epoch_seconds: start,
            end_epoch_seconds: end,
            duration_seconds: window_seconds,
        }),
        _ => Err(PivotError::DurationOutOfBounds(format!(
            "window of {window_seconds}s leaves the representable epoch range"
        ))),
    }
}

/// Build the range between two parsed instants, validated against `bounds`.
///
/// # Errors
///
/// Returns [`PivotError::RangeTooShort`] when `end - start` is below the
/// minimum (which covers an end at or before the start), or
/// [`PivotError::RangeTooLong`] when it exceeds the maximum.
pub fn explicit_range(start: &ParsedTime, end: &ParsedTime, bounds: RangeBounds) -> Result<TimeRange> {
    let duration = end.epoch_seconds - start.epoch_seconds;
    let min = bounds.min_seconds.max(1);
    if duration < min {
        return Err(PivotError::RangeTooShort(format!(
            "{duration}s between start and end; the minimum is {min}s"
        )));
    }
    if duration > bounds.max_seconds {
        return Err(PivotError::RangeTooLong(format!(
            "{duration}s between start and end; the maximum is {}s",
            bounds.max_seconds
        )));
    }
    Ok(TimeRange {
        start_epoch_seconds: start.epoch_seconds,
        end_epoch_seconds: end.epoch_seconds,
        duration_seconds: duration,
    })
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse_timestamp, FormatTag};
    use proptest::prelude::*;

    fn instant(epoch_seconds: i64) -> ParsedTime {
        ParsedTime {
            original_input: epoch_seconds.to_string(),
            epoch_seconds,
            format: FormatTag::UnixSeconds,
        }
    }

    // ── centered_window ─────────────────────────────────────────────────

    #[test]
    fn test_centered_window_concrete() {
        let center = parse_timestamp("2025-07-26T00:49:16Z").unwrap();
        let range = centered_window(&center, 5).unwrap();
        assert_eq!(range.start_epoch_seconds, 1753490954);
        assert_eq!(range.end_epoch_seconds, 1753490959);
        assert_eq!(range.duration_seconds, 5);
    }

    #[test]
    fn test_centered_window_even_split() {
        let range = centered_window(&instant(1_000_000_000), 60).unwrap();
        assert_eq!(range.start_epoch_seconds, 999_999_970);
        assert_eq!(range.end_epoch_seconds, 1_000_000_030);
    }

    #[test]
    fn test_centered_window_odd_window_leans_forward() {
        let range = centered_window(&instant(1_000_000_000), 7).unwrap();
        assert_eq!(1_000_000_000 - range.start_epoch_seconds, 3);
        assert_eq!(range.end_epoch_seconds - 1_000_000_000, 4);
    }

    #[test]
    fn test_centered_window_one_second() {
        let range = centered_window(&instant(1_000_000_000), 1).unwrap();
        assert_eq!(range.start_epoch_seconds, 1_000_000_000);
        assert_eq!(range.end_epoch_seconds, 1_000_000_001);
    }

    #[test]
    fn test_centered_window_rejects_nonpositive() {
        for window in [0, -5] {
            let result = centered_window(&instant(1_000_000_000), window);
            assert!(matches!(result, Err(PivotError::DurationOutOfBounds(_))));
        }
    }

    #[test]
    fn test_centered_window_rejects_overflow() {
        let result = centered_window(&instant(i64::MAX - 1), i64::MAX);
        assert!(matches!(result, Err(PivotError::DurationOutOfBounds(_))));
    }

    // ── explicit_range ──────────────────────────────────────────────────

    #[test]
    fn test_explicit_range_within_bounds() {
        let range = explicit_range(
            &instant(1753490956),
            &instant(1753490961),
            RangeBounds::new(1, 3600),
        )
        .unwrap();
        assert_eq!(range.duration_seconds, 5);
    }

    #[test]
    fn test_explicit_range_equal_instants_too_short() {
        let result = explicit_range(
            &instant(1753490956),
            &instant(1753490956),
            RangeBounds::new(1, 3600),
        );
        assert!(matches!(result, Err(PivotError::RangeTooShort(_))));
    }

    #[test]
    fn test_explicit_range_inverted_too_short() {
        let result = explicit_range(
            &instant(1753490961),
            &instant(1753490956),
            RangeBounds::new(1, 3600),
        );
        assert!(matches!(result, Err(PivotError::RangeTooShort(_))));
    }

    #[test]
    fn test_explicit_range_too_long() {
        let result = explicit_range(
            &instant(1753490956),
            &instant(1753490956 + 3601),
            RangeBounds::new(1, 3600),
        );
        assert!(matches!(result, Err(PivotError::RangeTooLong(_))));
    }

    #[test]
    fn test_explicit_range_unbounded_ceiling() {
        let week = 7 * 86400;
        let range = explicit_range(
            &instant(1753490956),
            &instant(1753490956 + week),
            RangeBounds::at_least(1),
        )
        .unwrap();
        assert_eq!(range.duration_seconds, week);
    }

    // ── Properties ──────────────────────────────────────────────────────

    proptest! {
        #[test]
        fn prop_centered_window_duration_exact(
            center in -4_102_444_800i64..4_102_444_800,
            window in 1i64..=1_000_000,
        ) {
            let range = centered_window(&instant(center), window).unwrap();
            prop_assert_eq!(range.end_epoch_seconds - range.start_epoch_seconds, window);
            prop_assert_eq!(center - range.start_epoch_seconds, window / 2);
            prop_assert_eq!(range.end_epoch_seconds - center, window - window / 2);
        }
    }
}

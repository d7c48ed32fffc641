//! Sample-based layout detection for tabular input.
//!
//! Sniffs the first few rows of a batch and classifies the overall row
//! shape once, before any row is parsed. Detection is deterministic for a
//! given input; it is a heuristic over the sample and is not re-run against
//! the remaining rows. Rows that diverge from the detected layout surface
//! later as per-row errors.

use serde::Serialize;

use crate::batch::{split_columns, TabularRow};

/// Rows examined from the head of a batch when classifying its layout.
const SAMPLE_ROWS: usize = 3;

/// Longest span, in seconds, a tabular row may request. Shared by the
/// duration column check and the default explicit-range bounds.
pub const MAX_ROW_DURATION_SECONDS: i64 = 3600;

/// The row shape of a whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LayoutTag {
    /// One timestamp per row; every row gets the caller's uniform window.
    SingleColumnUniform,
    /// `timestamp,duration` with the duration in `(0, 3600]` seconds.
    TimestampPlusDuration,
    /// `start,end`, both timestamps.
    StartAndEnd,
    /// Sampled rows use more than one recognizable shape.
    Mixed,
    /// At least one sampled row matches no shape, or the sample is empty.
    Unknown,
}

/// Classify the layout of a batch from a sample of its first rows.
///
/// Per sampled row: one column is [`LayoutTag::SingleColumnUniform`]; two
/// columns are [`LayoutTag::TimestampPlusDuration`] when the second column is
/// a pure non-negative numeral in `(0, 3600]`, otherwise
/// [`LayoutTag::StartAndEnd`] (whether it actually parses as a timestamp is
/// deferred to row-parse time); any other column count is
/// [`LayoutTag::Unknown`]. Unanimous samples decide the batch; disagreement
/// yields [`LayoutTag::Mixed`], or [`LayoutTag::Unknown`] when any sampled
/// row was unrecognizable.
pub fn detect_layout(rows: &[TabularRow]) -> LayoutTag {
    let mut candidates = rows
        .iter()
        .take(SAMPLE_ROWS)
        .map(|row| classify_row(&row.raw_text));
    let Some(mut tag) = candidates.next() else {
        return LayoutTag::Unknown;
    };
    for candidate in candidates {
        if candidate == tag {
            continue;
        }
        if candidate == LayoutTag::Unknown || tag == LayoutTag::Unknown {
            return LayoutTag::Unknown;
        }
        tag = LayoutTag::Mixed;
    }
    tag
}

fn classify_row(raw: &str) -> LayoutTag {
    let columns = split_columns(raw);
    match columns.len() {
        1 => LayoutTag::SingleColumnUniform,
        2 => {
            if duration_field(&columns[1]).is_some() {
                LayoutTag::TimestampPlusDuration
            } else {
                LayoutTag::StartAndEnd
            }
        }
        _ => LayoutTag::Unknown,
    }
}

/// Column text as a row duration: a pure non-negative numeral whose value
/// lies in `(0, MAX_ROW_DURATION_SECONDS]`. Anything else is `None`.
pub(crate) fn duration_field(text: &str) -> Option<i64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i64 = text.parse().ok()?;
    if value > 0 && value <= MAX_ROW_DURATION_SECONDS {
        Some(value)
    } else {
        None
    }
}

/// One-line reminder of the accepted row shapes, for layout errors.
pub(crate) fn layout_guide() -> &'static str {
    "accepted row shapes: '<timestamp>' (single column, uniform window), \
     '<timestamp>,<duration 1-3600s>', or '<start>,<end>'"
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(lines: &[&str]) -> Vec<TabularRow> {
        lines
            .iter()
            .enumerate()
            .map(|(index, line)| TabularRow {
                row_number: index + 1,
                raw_text: line.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_detect_single_column() {
        let layout = detect_layout(&rows(&[
            "2025-07-26T00:49:16Z",
            "1753490956",
            "2025-07-26 00:49:16",
        ]));
        assert_eq!(layout, LayoutTag::SingleColumnUniform);
    }

    #[test]
    fn test_detect_timestamp_plus_duration() {
        let layout = detect_layout(&rows(&[
            "2025-07-26T00:49:16Z,5",
            "2025-07-26T00:49:16Z,5",
            "2025-07-26T00:49:16Z,5",
        ]));
        assert_eq!(layout, LayoutTag::TimestampPlusDuration);
    }

    #[test]
    fn test_detect_start_and_end() {
        let layout = detect_layout(&rows(&[
            "2025-07-26T00:49:16Z,2025-07-26T00:49:21Z",
            "2025-07-26T00:49:16Z,2025-07-26T00:49:21Z",
            "2025-07-26T00:49:16Z,2025-07-26T00:49:21Z",
        ]));
        assert_eq!(layout, LayoutTag::StartAndEnd);
    }

    #[test]
    fn test_detect_duration_bounds_steer_classification() {
        // 3600 is a duration; 3601 reads as a second timestamp column.
        let in_range = detect_layout(&rows(&["t,3600"]));
        assert_eq!(in_range, LayoutTag::TimestampPlusDuration);
        let out_of_range = detect_layout(&rows(&["t,3601"]));
        assert_eq!(out_of_range, LayoutTag::StartAndEnd);
        let zero = detect_layout(&rows(&["t,0"]));
        assert_eq!(zero, LayoutTag::StartAndEnd);
    }

    #[test]
    fn test_detect_mixed_without_unknown() {
        let layout = detect_layout(&rows(&[
            "2025-07-26T00:49:16Z",
            "2025-07-26T00:49:16Z,5",
            "2025-07-26T00:49:16Z",
        ]));
        assert_eq!(layout, LayoutTag::Mixed);
    }

    #[test]
    fn test_detect_three_distinct_column_counts_is_unknown() {
        let layout = detect_layout(&rows(&["a", "a,b", "a,b,c"]));
        assert_eq!(layout, LayoutTag::Unknown);
    }

    #[test]
    fn test_detect_unknown_wins_over_mixed() {
        let layout = detect_layout(&rows(&["a,b,c", "a", "a,b"]));
        assert_eq!(layout, LayoutTag::Unknown);
    }

    #[test]
    fn test_detect_empty_sample_is_unknown() {
        assert_eq!(detect_layout(&[]), LayoutTag::Unknown);
    }

    #[test]
    fn test_detect_samples_only_leading_rows() {
        // The fourth row diverges; the sampled three decide the batch.
        let layout = detect_layout(&rows(&["a,5", "a,5", "a,5", "lone-column"]));
        assert_eq!(layout, LayoutTag::TimestampPlusDuration);
    }

    #[test]
    fn test_detect_is_deterministic() {
        let batch = rows(&["a", "a,b", "a"]);
        assert_eq!(detect_layout(&batch), detect_layout(&batch));
    }

    #[test]
    fn test_quoted_comma_is_one_column() {
        let layout = detect_layout(&rows(&["\"July 26, 2025\""]));
        assert_eq!(layout, LayoutTag::SingleColumnUniform);
    }

    #[test]
    fn test_duration_field_rejects_signs_and_blanks() {
        assert_eq!(duration_field("5"), Some(5));
        assert_eq!(duration_field("3600"), Some(3600));
        assert_eq!(duration_field("+5"), None);
        assert_eq!(duration_field("-5"), None);
        assert_eq!(duration_field("5.0"), None);
        assert_eq!(duration_field(""), None);
        assert_eq!(duration_field("99999999999999999999"), None);
    }
}

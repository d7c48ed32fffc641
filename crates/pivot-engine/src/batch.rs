//! Row tokenization and per-row parsing for tabular batches.
//!
//! Each row is tokenized with quote-aware comma splitting, then dispatched
//! according to the batch's detected [`LayoutTag`]. Row failures are
//! collected, never fatal; the batch itself fails only on an unusable layout,
//! a missing uniform window, or when not a single row succeeds.

use tracing::debug;

use crate::error::{PivotError, Result};
use crate::layout::{
    detect_layout, duration_field, layout_guide, LayoutTag, MAX_ROW_DURATION_SECONDS,
};
use crate::parse::parse_timestamp;
use crate::range::{centered_window, explicit_range, RangeBounds, TimeRange};

/// One data row of a batch, carrying its 1-based physical line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularRow {
    pub row_number: usize,
    pub raw_text: String,
}

/// Caller-supplied policy for a batch.
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Window applied to every row of a single-column batch. Required for
    /// that layout, ignored by the others.
    pub uniform_window: Option<i64>,
    /// Bounds applied to explicit start/end rows.
    pub bounds: RangeBounds,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            uniform_window: None,
            bounds: RangeBounds::new(1, MAX_ROW_DURATION_SECONDS),
        }
    }
}

/// The per-row result of a batch: a range, or the error that row produced.
#[derive(Debug)]
pub struct RowOutcome {
    pub row_number: usize,
    pub result: Result<TimeRange>,
}

/// Everything a rendering layer needs about one parsed batch.
#[derive(Debug)]
pub struct BatchReport {
    pub layout: LayoutTag,
    pub outcomes: Vec<RowOutcome>,
    pub total_rows: usize,
    pub valid_entries: usize,
    pub error_count: usize,
}

impl BatchReport {
    /// The failed rows, in input order.
    pub fn row_errors(&self) -> impl Iterator<Item = (usize, &PivotError)> {
        self.outcomes.iter().filter_map(|outcome| match &outcome.result {
            Err(error) => Some((outcome.row_number, error)),
            Ok(_) => None,
        })
    }

    /// The first `limit` row errors verbatim, then a one-line count of the
    /// rest.
    pub fn error_digest(&self, limit: usize) -> Vec<String> {
        let mut lines: Vec<String> = self
            .row_errors()
            .take(limit)
            .map(|(row, error)| format!("row {row}: {error}"))
            .collect();
        let remaining = self.error_count.saturating_sub(limit);
        if remaining > 0 {
            lines.push(format!("... and {remaining} more"));
        }
        lines
    }
}

/// Split multi-line text into data rows.
///
/// Blank lines and `#`-prefixed comment lines are skipped; surviving rows are
/// trimmed and keep their 1-based physical line numbers, so diagnostics point
/// at the line the user can see.
///
/// # Examples
///
/// ```
/// use pivot_engine::rows_from_text;
///
/// let rows = rows_from_text("# pivots\n\n2025-07-26T00:49:16Z,5\n");
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].row_number, 3);
/// ```
pub fn rows_from_text(text: &str) -> Vec<TabularRow> {
    text.lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }
            Some(TabularRow {
                row_number: index + 1,
                raw_text: trimmed.to_string(),
            })
        })
        .collect()
}

/// Split one row into columns.
///
/// Comma-separated with `"`-quoted fields: a doubled `""` inside quotes is a
/// literal quote and commas inside quotes do not split. An unterminated quote
/// runs to the end of the line. Columns are trimmed.
pub(crate) fn split_columns(row: &str) -> Vec<String> {
    let mut columns = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = row.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                columns.push(field.trim().to_string());
                field.clear();
            }
            _ => field.push(ch),
        }
    }
    columns.push(field.trim().to_string());
    columns
}

/// Detect the batch layout from the leading rows, then parse every row.
///
/// Equivalent to [`detect_layout`] followed by [`parse_batch_with_layout`].
///
/// # Examples
///
/// ```
/// use pivot_engine::{parse_batch, rows_from_text, BatchOptions};
///
/// let rows = rows_from_text("2025-07-26T00:49:16Z,5\n");
/// let report = parse_batch(&rows, &BatchOptions::default()).unwrap();
/// assert_eq!(report.valid_entries, 1);
/// ```
pub fn parse_batch(rows: &[TabularRow], options: &BatchOptions) -> Result<BatchReport> {
    let layout = detect_layout(rows);
    debug!(?layout, rows = rows.len(), "classified batch layout");
    parse_batch_with_layout(rows, layout, options)
}

/// Parse every row of a batch under an already-detected layout.
///
/// Row failures (wrong column count, unparseable timestamp, out-of-range
/// duration) are collected per row and do not stop the remaining rows.
///
/// # Errors
///
/// Fails before touching any row with [`PivotError::MixedLayout`] or
/// [`PivotError::UnknownLayout`] for an unusable layout, or
/// [`PivotError::MissingUniformWindow`] when a single-column batch arrives
/// without `options.uniform_window`. Fails after the rows with
/// [`PivotError::NoValidRows`] when none of them succeeded.
pub fn parse_batch_with_layout(
    rows: &[TabularRow],
    layout: LayoutTag,
    options: &BatchOptions,
) -> Result<BatchReport> {
    match layout {
        LayoutTag::Mixed => {
            return Err(PivotError::MixedLayout(format!(
                "the sampled rows use more than one shape; {}",
                layout_guide()
            )));
        }
        LayoutTag::Unknown => {
            return Err(PivotError::UnknownLayout(format!(
                "the sampled rows match no supported shape; {}",
                layout_guide()
            )));
        }
        LayoutTag::SingleColumnUniform if options.uniform_window.is_none() => {
            return Err(PivotError::MissingUniformWindow(
                "single-column input needs a caller-supplied window".to_string(),
            ));
        }
        _ => {}
    }

    let mut outcomes = Vec::with_capacity(rows.len());
    let mut valid_entries = 0;
    for row in rows {
        let result = parse_row(row, layout, options);
        match &result {
            Ok(_) => valid_entries += 1,
            Err(error) => debug!(row = row.row_number, %error, "row rejected"),
        }
        outcomes.push(RowOutcome {
            row_number: row.row_number,
            result,
        });
    }

    let total_rows = rows.len();
    let report = BatchReport {
        layout,
        outcomes,
        total_rows,
        valid_entries,
        error_count: total_rows - valid_entries,
    };
    if report.valid_entries == 0 {
        let message = if total_rows == 0 {
            "input contained no data rows".to_string()
        } else {
            format!(
                "all {total_rows} rows failed; {}",
                report.error_digest(3).join("; ")
            )
        };
        return Err(PivotError::NoValidRows(message));
    }
    Ok(report)
}

fn parse_row(row: &TabularRow, layout: LayoutTag, options: &BatchOptions) -> Result<TimeRange> {
    let columns = split_columns(&row.raw_text);
    match layout {
        LayoutTag::SingleColumnUniform => {
            require_columns(&columns, 1)?;
            let window = options.uniform_window.ok_or_else(|| {
                PivotError::MissingUniformWindow(
                    "single-column input needs a caller-supplied window".to_string(),
                )
            })?;
            let center = parse_timestamp(&columns[0])?;
            centered_window(&center, window)
        }
        LayoutTag::TimestampPlusDuration => {
            require_columns(&columns, 2)?;
            let duration = duration_field(&columns[1]).ok_or_else(|| {
                PivotError::DurationOutOfBounds(format!(
                    "'{}' is not a whole number of seconds in (0, {MAX_ROW_DURATION_SECONDS}]",
                    columns[1]
                ))
            })?;
            let center = parse_timestamp(&columns[0])?;
            centered_window(&center, duration)
        }
        LayoutTag::StartAndEnd => {
            require_columns(&columns, 2)?;
            let start = parse_timestamp(&columns[0])?;
            let end = parse_timestamp(&columns[1])?;
            explicit_range(&start, &end, options.bounds)
        }
        LayoutTag::Mixed => Err(PivotError::MixedLayout(layout_guide().to_string())),
        LayoutTag::Unknown => Err(PivotError::UnknownLayout(layout_guide().to_string())),
    }
}

fn require_columns(columns: &[String], expected: usize) -> Result<()> {
    if columns.len() == expected {
        Ok(())
    } else {
        Err(PivotError::ColumnCountMismatch(format!(
            "expected {expected} column(s), found {}",
            columns.len()
        )))
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

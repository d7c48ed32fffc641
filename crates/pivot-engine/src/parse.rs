//! Timestamp normalization.
//!
//! Converts heterogeneous textual timestamps into a canonical UTC instant
//! ([`ParsedTime`]). The recognizer is a closed, ordered list of
//! matcher/validator stages: each stage is tried independently against the
//! trimmed input, the first syntactic match wins, and its validator decides
//! between a value and a [`PivotError::SemanticMismatch`]. Later stages are
//! never consulted after a match.
//!
//! # Determinism
//!
//! Parsing is a pure function of its input. Timestamps without an explicit
//! offset are interpreted as UTC, never as machine-local time, so the same
//! input yields the same instant on every host. Integer-second values are
//! computed without passing through floating point; fractional digits are
//! validated syntactically and then discarded (floor). All patterns are
//! anchored and free of nested quantifiers, so recognition or rejection
//! completes in time linear in the input length regardless of content.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::Serialize;

use crate::error::{PivotError, Result};

/// Bare numerals are only read as Unix seconds inside the years 2000..2100.
/// Anything shorter is indistinguishable from an ordinary small number.
const UNIX_SECONDS_MIN: i64 = 946_684_800;
const UNIX_SECONDS_MAX: i64 = 4_102_444_800;
const UNIX_MILLIS_MIN: i64 = 946_684_800_000;
const UNIX_MILLIS_MAX: i64 = 4_102_444_800_000;

/// Which recognizer stage produced a [`ParsedTime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FormatTag {
    /// `YYYY-MM-DDTHH:MM:SS[.fraction](Z|±HH:MM)?`
    Iso8601,
    /// Bare numeral read as seconds since the Unix epoch.
    UnixSeconds,
    /// Bare numeral read as milliseconds since the Unix epoch.
    UnixMillis,
    /// `YYYY-MM-DD`, `YYYY/MM/DD`, or `MM/DD/YYYY` followed by `HH:MM:SS`.
    SimpleDateTime,
    /// Same date shapes with the seconds field absent (defaulted to 0).
    TruncatedDateTime,
}

/// A canonical UTC instant produced by [`parse_timestamp`].
///
/// Immutable once created. `epoch_seconds` is the floor of the instant:
/// fractional input never changes the integer-second result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedTime {
    /// The raw input, preserved verbatim (untrimmed).
    pub original_input: String,
    /// Whole seconds since 1970-01-01T00:00:00Z.
    pub epoch_seconds: i64,
    /// Which stage recognized the input.
    pub format: FormatTag,
}

// ── Pattern table ───────────────────────────────────────────────────────────

struct Patterns {
    iso8601: Regex,
    bare_numeral: Regex,
    dash_ymd_hms: Regex,
    slash_ymd_hms: Regex,
    slash_mdy_hms: Regex,
    dash_ymd_hm: Regex,
    slash_ymd_hm: Regex,
    slash_mdy_hm: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(Patterns::new)
}

impl Patterns {
    fn new() -> Self {
        Self {
            // 2025-07-26T00:49:16.2146161Z, offset suffix optional
            iso8601: Regex::new(
                r"^(\d{4})-(\d{2})-(\d{2})T(\d{2}):(\d{2}):(\d{2})(?:\.(\d+))?(?:Z|([+-])(\d{2}):(\d{2}))?$",
            )
            .unwrap(),
            // 1753490956 or 1753490956.214
            bare_numeral: Regex::new(r"^(\d+)(?:\.\d+)?$").unwrap(),
            // 2025-07-26 00:49:16.21
            dash_ymd_hms: Regex::new(
                r"^(\d{4})-(\d{1,2})-(\d{1,2})\s+(\d{1,2}):(\d{1,2}):(\d{1,2})(?:\.\d+)?$",
            )
            .unwrap(),
            // 2025/07/26 00:49:16
            slash_ymd_hms: Regex::new(
                r"^(\d{4})/(\d{1,2})/(\d{1,2})\s+(\d{1,2}):(\d{1,2}):(\d{1,2})(?:\.\d+)?$",
            )
            .unwrap(),
            // 07/26/2025 00:49:16
            slash_mdy_hms: Regex::new(
                r"^(\d{1,2})/(\d{1,2})/(\d{4})\s+(\d{1,2}):(\d{1,2}):(\d{1,2})(?:\.\d+)?$",
            )
            .unwrap(),
            // 2025-07-26 00:49
            dash_ymd_hm: Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})\s+(\d{1,2}):(\d{1,2})$").unwrap(),
            // 2025/07/26 00:49
            slash_ymd_hm: Regex::new(r"^(\d{4})/(\d{1,2})/(\d{1,2})\s+(\d{1,2}):(\d{1,2})$").unwrap(),
            // 07/26/2025 00:49
            slash_mdy_hm: Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})\s+(\d{1,2}):(\d{1,2})$").unwrap(),
        }
    }
}

// ── Recognizer cascade ──────────────────────────────────────────────────────

/// One recognizer stage. `None` means the stage did not match syntactically
/// and the next stage is tried; `Some(Err(..))` means the stage matched but
/// the fields name no real instant, which is terminal for the whole parse.
type Stage = fn(&str) -> Option<Result<(i64, FormatTag)>>;

const STAGES: [Stage; 5] = [
    match_iso8601,
    match_unix_seconds,
    match_unix_millis,
    match_simple_date_time,
    match_truncated_date_time,
];

/// Parse one textual timestamp into a canonical UTC instant.
///
/// The input is trimmed and handed to each recognizer stage in a fixed
/// order: ISO-8601, Unix seconds, Unix milliseconds, simple date-time,
/// then date-time without seconds.
///
/// # Errors
///
/// Returns [`PivotError::EmptyInput`] if the trimmed input is empty,
/// [`PivotError::UnrecognizedFormat`] if no stage matches, or
/// [`PivotError::SemanticMismatch`] if a stage matches syntactically but its
/// fields name no real calendar instant (February 30th is rejected, never
/// rolled over into March).
///
/// # Examples
///
/// ```
/// use pivot_engine::{parse_timestamp, FormatTag};
///
/// let t = parse_timestamp("2025-07-26T00:49:16.2146161Z").unwrap();
/// assert_eq!(t.epoch_seconds, 1753490956);
/// assert_eq!(t.format, FormatTag::Iso8601);
/// ```
pub fn parse_timestamp(input: &str) -> Result<ParsedTime> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PivotError::EmptyInput);
    }
    for stage in STAGES {
        if let Some(outcome) = stage(trimmed) {
            let (epoch_seconds, format) = outcome?;
            return Ok(ParsedTime {
                original_input: input.to_string(),
                epoch_seconds,
                format,
            });
        }
    }
    Err(PivotError::UnrecognizedFormat(format!("'{trimmed}'")))
}

// ── Stages ──────────────────────────────────────────────────────────────────

fn match_iso8601(input: &str) -> Option<Result<(i64, FormatTag)>> {
    let caps = patterns().iso8601.captures(input)?;
    let fields = DateTimeFields {
        year: caps[1].parse().ok()?,
        month: caps[2].parse().ok()?,
        day: caps[3].parse().ok()?,
        hour: caps[4].parse().ok()?,
        minute: caps[5].parse().ok()?,
        second: caps[6].parse().ok()?,
    };
    // Group 7 is the fractional part: syntax already validated, value floored away.
    let offset_seconds = match (caps.get(8), caps.get(9), caps.get(10)) {
        (Some(sign), Some(hours), Some(minutes)) => {
            let hours: i64 = hours.as_str().parse().ok()?;
            let minutes: i64 = minutes.as_str().parse().ok()?;
            if hours > 23 || minutes > 59 {
                return Some(Err(PivotError::SemanticMismatch(format!(
                    "UTC offset {}{hours:02}:{minutes:02} out of range in '{input}'",
                    sign.as_str()
                ))));
            }
            let magnitude = hours * 3600 + minutes * 60;
            if sign.as_str() == "-" {
                -magnitude
            } else {
                magnitude
            }
        }
        // Bare `Z` or no suffix at all: the instant is UTC.
        _ => 0,
    };
    Some(calendar_epoch(input, fields).map(|epoch| (epoch - offset_seconds, FormatTag::Iso8601)))
}

fn match_unix_seconds(input: &str) -> Option<Result<(i64, FormatTag)>> {
    let value = bare_numeral_value(input)?;
    if (UNIX_SECONDS_MIN..UNIX_SECONDS_MAX).contains(&value) {
        Some(Ok((value, FormatTag::UnixSeconds)))
    } else {
        None
    }
}

fn match_unix_millis(input: &str) -> Option<Result<(i64, FormatTag)>> {
    let value = bare_numeral_value(input)?;
    if (UNIX_MILLIS_MIN..UNIX_MILLIS_MAX).contains(&value) {
        Some(Ok((value / 1000, FormatTag::UnixMillis)))
    } else {
        None
    }
}

fn match_simple_date_time(input: &str) -> Option<Result<(i64, FormatTag)>> {
    let fields = capture_date_time(input, true)?;
    Some(calendar_epoch(input, fields).map(|epoch| (epoch, FormatTag::SimpleDateTime)))
}

fn match_truncated_date_time(input: &str) -> Option<Result<(i64, FormatTag)>> {
    let fields = capture_date_time(input, false)?;
    Some(calendar_epoch(input, fields).map(|epoch| (epoch, FormatTag::TruncatedDateTime)))
}

// ── Field extraction and validation ─────────────────────────────────────────

struct DateTimeFields {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
}

#[derive(Clone, Copy)]
enum DateOrder {
    YearFirst,
    MonthFirst,
}

/// Integer part of a bare numeral, parsed without passing through floating
/// point. Numerals too large for `i64` do not match.
fn bare_numeral_value(input: &str) -> Option<i64> {
    let caps = patterns().bare_numeral.captures(input)?;
    caps[1].parse().ok()
}

/// Match the three simple date shapes, with or without a seconds field.
/// Returns raw fields; range checking happens in [`calendar_epoch`].
fn capture_date_time(input: &str, with_seconds: bool) -> Option<DateTimeFields> {
    let p = patterns();
    let table: [(&Regex, DateOrder); 3] = if with_seconds {
        [
            (&p.dash_ymd_hms, DateOrder::YearFirst),
            (&p.slash_ymd_hms, DateOrder::YearFirst),
            (&p.slash_mdy_hms, DateOrder::MonthFirst),
        ]
    } else {
        [
            (&p.dash_ymd_hm, DateOrder::YearFirst),
            (&p.slash_ymd_hm, DateOrder::YearFirst),
            (&p.slash_mdy_hm, DateOrder::MonthFirst),
        ]
    };
    for (pattern, order) in table {
        if let Some(caps) = pattern.captures(input) {
            let (year_idx, month_idx, day_idx) = match order {
                DateOrder::YearFirst => (1, 2, 3),
                DateOrder::MonthFirst => (3, 1, 2),
            };
            let second = if with_seconds { caps[6].parse().ok()? } else { 0 };
            return Some(DateTimeFields {
                year: caps[year_idx].parse().ok()?,
                month: caps[month_idx].parse().ok()?,
                day: caps[day_idx].parse().ok()?,
                hour: caps[4].parse().ok()?,
                minute: caps[5].parse().ok()?,
                second,
            });
        }
    }
    None
}

/// Epoch seconds for a calendar date-time, rejecting field combinations the
/// calendar does not contain (February 30th, April 31st, hour 24) instead of
/// normalizing them into a neighboring instant.
fn calendar_epoch(input: &str, f: DateTimeFields) -> Result<i64> {
    let date = NaiveDate::from_ymd_opt(f.year, f.month, f.day);
    let time = NaiveTime::from_hms_opt(f.hour, f.minute, f.second);
    match (date, time) {
        (Some(date), Some(time)) => Ok(NaiveDateTime::new(date, time).and_utc().timestamp()),
        _ => Err(PivotError::SemanticMismatch(format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02} in '{input}'",
            f.year, f.month, f.day, f.hour, f.minute, f.second
        ))),
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

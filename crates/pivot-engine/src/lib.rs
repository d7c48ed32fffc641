//! # pivot-engine
//!
//! Deterministic timestamp normalization and time-window derivation.
//!
//! The engine converts heterogeneous textual timestamps (ISO-8601 with any
//! fractional-second precision, Unix epoch seconds or milliseconds, simple
//! and truncated date-times) into canonical UTC instants, derives bounded
//! time ranges from single instants or instant pairs, and classifies
//! multi-row tabular input before parsing it row by row. Every operation is
//! a pure function of its input: no system clock, no process timezone, no
//! shared mutable state. Callers may fan rows out across threads and
//! reassemble outcomes by row number.
//!
//! ## Modules
//!
//! - [`parse`] — one textual timestamp → canonical UTC instant
//! - [`range`] — centered windows and bounded explicit ranges
//! - [`layout`] — sample-based classification of tabular row shapes
//! - [`batch`] — quote-aware tokenization and per-row parsing with recovery
//! - [`error`] — error types

pub mod batch;
pub mod error;
pub mod layout;
pub mod parse;
pub mod range;

pub use batch::{
    parse_batch, parse_batch_with_layout, rows_from_text, BatchOptions, BatchReport, RowOutcome,
    TabularRow,
};
pub use error::PivotError;
pub use layout::{detect_layout, LayoutTag, MAX_ROW_DURATION_SECONDS};
pub use parse::{parse_timestamp, FormatTag, ParsedTime};
pub use range::{centered_window, explicit_range, RangeBounds, TimeRange};

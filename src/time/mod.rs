//! Time extraction module
//!
//! This module derives capture timestamps from filenames:
//! - Pattern library of device and app naming conventions
//! - Calendar validation of decoded digits
//! - Tiered extraction with a rightmost-match tie-break
//! - Loose date suggestions when extraction fails
//! - Parsing of operator-entered dates

pub mod calendar;
pub mod filename;
pub mod manual;
pub mod pattern;
pub mod suggest;

pub use filename::{ExtractionCandidate, extract};
pub use manual::{DISPLAY_FORMAT, ManualInputError, parse_manual_datetime};
pub use suggest::{Suggestion, suggest};

use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::Path;

/// Where the datetime applied to a file came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "lowercase")]
pub enum TimeSource {
    /// Matched a filename pattern (pattern id)
    Filename(&'static str),
    /// Operator picked a suggested date
    Suggestion,
    /// Operator typed the date
    Manual,
    /// Batch datetime shared by the rest of the run
    Batch,
}

/// Result of filename extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedTime {
    /// The extracted timestamp; 12:00:00 when `carries_time` is false
    pub timestamp: NaiveDateTime,
    /// Whether the filename held a real time of day
    pub carries_time: bool,
    /// Id of the pattern that matched
    pub pattern: &'static str,
}

/// Filename without its extension
pub fn file_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
}

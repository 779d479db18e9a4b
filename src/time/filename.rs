//! Filename timestamp extraction
//!
//! Walks the pattern tiers in priority order. Inside a tier every match of
//! every pattern is validated; the rightmost valid match wins, because
//! trailing digit groups are more often the real timestamp than leading
//! device counters. That rule is a heuristic, not a guarantee.

use super::calendar::{self, RawDateTime};
use super::pattern::{self, DATE_TIERS, DATETIME_TIERS, Field, FilenamePattern, PatternTier};
use super::{ExtractedTime, file_stem};
use crate::config::MediaKind;
use chrono::NaiveDateTime;
use regex::Captures;
use tracing::{debug, trace};

/// A validated match, before the tie-break
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionCandidate {
    pub timestamp: NaiveDateTime,
    pub carries_time: bool,
    pub pattern: &'static str,
    /// Byte offset of the match in the extension-less name
    pub start: usize,
}

/// Extract a capture datetime from a filename
///
/// Returns `None` when no tier yields a calendar-valid match. Date-only
/// matches get the 12:00:00 default time and `carries_time = false`.
pub fn extract(filename: &str, kind: MediaKind) -> Option<ExtractedTime> {
    let stem = file_stem(filename);

    if pattern::is_sequence_only(stem) {
        trace!(filename, ?kind, "Sequential counter name, nothing to extract");
        return None;
    }

    let best = DATETIME_TIERS
        .iter()
        .chain(DATE_TIERS.iter())
        .find_map(|tier| best_in_tier(tier, stem))?;

    debug!(
        filename,
        ?kind,
        pattern = best.pattern,
        timestamp = %best.timestamp,
        "Extracted time from filename"
    );

    Some(ExtractedTime {
        timestamp: best.timestamp,
        carries_time: best.carries_time,
        pattern: best.pattern,
    })
}

/// Every valid candidate of one tier, in table then position order
pub fn tier_candidates(tier: &PatternTier, stem: &str) -> Vec<ExtractionCandidate> {
    let mut candidates = Vec::new();
    for pattern in &tier.patterns {
        for caps in pattern.regex.captures_iter(stem) {
            if let Some(candidate) = candidate_from(pattern, &caps) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

fn best_in_tier(tier: &PatternTier, stem: &str) -> Option<ExtractionCandidate> {
    let candidates = tier_candidates(tier, stem);
    if candidates.len() > 1 {
        trace!(tier = tier.name, count = candidates.len(), "Several matches in tier, taking the rightmost");
    }
    // max_by_key keeps the last of equal keys, so ties go to the later pattern
    candidates.into_iter().max_by_key(|c| c.start)
}

fn candidate_from(pattern: &FilenamePattern, caps: &Captures<'_>) -> Option<ExtractionCandidate> {
    let whole = caps.get(0)?;
    let mut raw = RawDateTime::date_at_noon(0, 0, 0);

    for (index, field) in pattern.fields.iter().enumerate() {
        let digits = caps.get(index + 1)?.as_str();
        match field {
            Field::Year => raw.year = digits.parse().ok()?,
            Field::Month => raw.month = digits.parse().ok()?,
            Field::Day => raw.day = digits.parse().ok()?,
            Field::Hour => raw.hour = digits.parse().ok()?,
            Field::Minute => raw.minute = digits.parse().ok()?,
            Field::Second => raw.second = digits.parse().ok()?,
        }
    }

    match calendar::validate(&raw) {
        Ok(timestamp) => Some(ExtractionCandidate {
            timestamp,
            carries_time: pattern.carries_time,
            pattern: pattern.id,
            start: whole.start(),
        }),
        Err(reason) => {
            debug!(
                pattern = pattern.id,
                matched = whole.as_str(),
                %reason,
                "Discarding invalid match"
            );
            None
        }
    }
}

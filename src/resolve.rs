//! Operator decisions
//!
//! The processor never reads the console itself. It builds a
//! [`DecisionRequest`] and hands it to a [`Resolver`], which answers with a
//! [`Decision`]. The console, the `--no-prompt` mode and tests each plug in
//! their own resolver.

use crate::config::ConfigError;
use crate::error::{Error, Result};
use crate::time::{ExtractedTime, Suggestion, TimeSource};
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::warn;

/// What the operator is asked about one file
#[derive(Debug, Clone)]
pub struct DecisionRequest<'a> {
    pub filename: &'a str,
    /// 1-based position in the run
    pub index: usize,
    pub total: usize,
    /// Extraction result, if any
    pub detected: Option<&'a ExtractedTime>,
    pub suggestions: &'a [Suggestion],
    /// Whether "use this date for all remaining files" is offered
    pub allow_batch: bool,
}

/// The operator's answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Use the detected datetime
    Accept,
    /// Use suggestion `n` (0-based) at 12:00:00
    PickSuggestion(usize),
    /// Use a typed datetime for this file only
    Manual(NaiveDateTime),
    /// Leave this file alone
    Skip,
    /// Use a typed datetime for this and every remaining file
    ApplyToRemaining(NaiveDateTime),
}

/// A datetime chosen by the operator, possibly memoized for the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchDecision {
    pub timestamp: NaiveDateTime,
    pub apply_to_remaining: bool,
}

/// What the processor does with a file after asking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Apply {
        timestamp: NaiveDateTime,
        source: TimeSource,
    },
    Batch(BatchDecision),
    Skip,
}

impl Decision {
    /// Turn an answer into a resolution; answers that don't fit the
    /// request are treated as a skip
    pub fn resolve(self, request: &DecisionRequest<'_>) -> Resolution {
        match self {
            Decision::Accept => match request.detected {
                Some(found) => Resolution::Apply {
                    timestamp: found.timestamp,
                    source: TimeSource::Filename(found.pattern),
                },
                None => {
                    warn!(file = request.filename, "Accept chosen with nothing detected, skipping");
                    Resolution::Skip
                }
            },
            Decision::PickSuggestion(n) => match request.suggestions.get(n) {
                Some(suggestion) => Resolution::Apply {
                    timestamp: suggestion.at_default_time(),
                    source: TimeSource::Suggestion,
                },
                None => {
                    warn!(file = request.filename, index = n, "No such suggestion, skipping");
                    Resolution::Skip
                }
            },
            Decision::Manual(timestamp) => Resolution::Batch(BatchDecision {
                timestamp,
                apply_to_remaining: false,
            }),
            Decision::ApplyToRemaining(timestamp) => Resolution::Batch(BatchDecision {
                timestamp,
                apply_to_remaining: true,
            }),
            Decision::Skip => Resolution::Skip,
        }
    }
}

/// Synchronous request/response boundary to the operator
pub trait Resolver {
    /// Decide the datetime for one file
    fn resolve(&mut self, request: &DecisionRequest<'_>) -> Result<Decision>;

    /// One datetime for every file of a batch-mode run
    fn batch_datetime(&mut self, input_dir: &Path) -> Result<NaiveDateTime>;
}

/// Resolver for unattended runs: accepts what was detected, skips the rest
#[derive(Debug, Clone, Default)]
pub struct NonInteractive {
    batch: Option<NaiveDateTime>,
}

impl NonInteractive {
    pub fn new(batch: Option<NaiveDateTime>) -> Self {
        Self { batch }
    }
}

impl Resolver for NonInteractive {
    fn resolve(&mut self, request: &DecisionRequest<'_>) -> Result<Decision> {
        Ok(if request.detected.is_some() {
            Decision::Accept
        } else {
            Decision::Skip
        })
    }

    fn batch_datetime(&mut self, _input_dir: &Path) -> Result<NaiveDateTime> {
        self.batch.ok_or_else(|| {
            Error::Config(ConfigError::Invalid(
                "batch mode without prompts needs a batch date".into(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request<'a>(detected: Option<&'a ExtractedTime>, suggestions: &'a [Suggestion]) -> DecisionRequest<'a> {
        DecisionRequest {
            filename: "clip.mp4",
            index: 1,
            total: 1,
            detected,
            suggestions,
            allow_batch: detected.is_none(),
        }
    }

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 12, 25).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn test_accept_uses_detected() {
        let found = ExtractedTime {
            timestamp: at(9),
            carries_time: true,
            pattern: "camera-label",
        };
        let req = request(Some(&found), &[]);
        assert_eq!(
            Decision::Accept.resolve(&req),
            Resolution::Apply {
                timestamp: at(9),
                source: TimeSource::Filename("camera-label")
            }
        );
    }

    #[test]
    fn test_accept_without_detection_skips() {
        assert_eq!(Decision::Accept.resolve(&request(None, &[])), Resolution::Skip);
    }

    #[test]
    fn test_pick_suggestion() {
        let suggestions = [Suggestion {
            date: NaiveDate::from_ymd_opt(2023, 12, 25).unwrap(),
            reading: "YYYYMMDD",
        }];
        let req = request(None, &suggestions);
        assert_eq!(
            Decision::PickSuggestion(0).resolve(&req),
            Resolution::Apply {
                timestamp: at(12),
                source: TimeSource::Suggestion
            }
        );
        assert_eq!(Decision::PickSuggestion(3).resolve(&req), Resolution::Skip);
    }

    #[test]
    fn test_manual_and_batch() {
        let req = request(None, &[]);
        assert_eq!(
            Decision::Manual(at(8)).resolve(&req),
            Resolution::Batch(BatchDecision {
                timestamp: at(8),
                apply_to_remaining: false
            })
        );
        assert_eq!(
            Decision::ApplyToRemaining(at(8)).resolve(&req),
            Resolution::Batch(BatchDecision {
                timestamp: at(8),
                apply_to_remaining: true
            })
        );
    }

    #[test]
    fn test_non_interactive() {
        let found = ExtractedTime {
            timestamp: at(9),
            carries_time: true,
            pattern: "pixel",
        };
        let mut resolver = NonInteractive::default();
        assert_eq!(resolver.resolve(&request(Some(&found), &[])).unwrap(), Decision::Accept);
        assert_eq!(resolver.resolve(&request(None, &[])).unwrap(), Decision::Skip);
        assert!(matches!(resolver.batch_datetime(Path::new("x")), Err(Error::Config(_))));

        let mut resolver = NonInteractive::new(Some(at(7)));
        assert_eq!(resolver.batch_datetime(Path::new("x")).unwrap(), at(7));
    }
}

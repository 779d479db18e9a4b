//! Calendar validation for raw date/time tuples
//!
//! Filename digits are only trusted once they form a real calendar date,
//! a real time of day, and a year inside a plausible capture window.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Earliest year accepted as a capture date
pub const MIN_YEAR: i32 = 2000;

/// Upper year bound for loose suggestions shown to the operator
pub const SUGGESTION_MAX_YEAR: i32 = 2100;

/// Unvalidated date/time fields as decoded from digits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawDateTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl RawDateTime {
    /// Date with the 12:00:00 default time
    pub fn date_at_noon(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour: 12,
            minute: 0,
            second: 0,
        }
    }
}

/// Inclusive window of plausible years
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    pub min: i32,
    pub max: i32,
}

impl YearWindow {
    /// Capture window: [2000, current year + 1], read from the clock now
    pub fn capture() -> Self {
        Self {
            min: MIN_YEAR,
            max: Local::now().year() + 1,
        }
    }

    /// Looser window used for suggestions
    pub const fn suggestion() -> Self {
        Self {
            min: MIN_YEAR,
            max: SUGGESTION_MAX_YEAR,
        }
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }
}

/// Why a tuple was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("month {0} is not in 1-12")]
    Month(u32),
    #[error("day {day} is not valid for month {month} (max {max})")]
    Day { day: u32, month: u32, max: u32 },
    #[error("hour {0} is not in 0-23")]
    Hour(u32),
    #[error("minute {0} is not in 0-59")]
    Minute(u32),
    #[error("second {0} is not in 0-59")]
    Second(u32),
    #[error("year {year} is outside {min}-{max}")]
    Year { year: i32, min: i32, max: i32 },
}

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Days in `month` of `year`; 0 for a month outside 1-12
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Validate against the capture window
pub fn validate(raw: &RawDateTime) -> Result<NaiveDateTime, CalendarError> {
    validate_in(raw, YearWindow::capture())
}

/// Validate a tuple, checking fields in calendar order
pub fn validate_in(raw: &RawDateTime, window: YearWindow) -> Result<NaiveDateTime, CalendarError> {
    if !(1..=12).contains(&raw.month) {
        return Err(CalendarError::Month(raw.month));
    }
    let max = days_in_month(raw.year, raw.month);
    if !(1..=max).contains(&raw.day) {
        return Err(CalendarError::Day {
            day: raw.day,
            month: raw.month,
            max,
        });
    }
    if raw.hour > 23 {
        return Err(CalendarError::Hour(raw.hour));
    }
    if raw.minute > 59 {
        return Err(CalendarError::Minute(raw.minute));
    }
    if raw.second > 59 {
        return Err(CalendarError::Second(raw.second));
    }
    if !window.contains(raw.year) {
        return Err(CalendarError::Year {
            year: raw.year,
            min: window.min,
            max: window.max,
        });
    }

    // Every field was range-checked above, so chrono accepts the tuple.
    NaiveDate::from_ymd_opt(raw.year, raw.month, raw.day)
        .and_then(|date| date.and_hms_opt(raw.hour, raw.minute, raw.second))
        .ok_or(CalendarError::Day {
            day: raw.day,
            month: raw.month,
            max,
        })
}

//! Fallback date suggestions from loose digit groups
//!
//! Used when extraction finds nothing or the operator rejects what it
//! found. These are guesses for a human to pick from, so the year window
//! is wider than the one extraction trusts.

use super::calendar::{self, RawDateTime, YearWindow};
use super::file_stem;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Most suggestions offered for one file
pub const MAX_SUGGESTIONS: usize = 3;

/// A plausible date and how the digits were read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub date: NaiveDate,
    pub reading: &'static str,
}

impl Suggestion {
    /// The suggestion at 12:00:00
    pub fn at_default_time(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default())
    }
}

#[derive(Clone, Copy)]
enum Order {
    DayMonthYear,
    YearMonthDay,
}

struct LooseScan {
    reading: &'static str,
    regex: Regex,
    order: Order,
}

static SCANS: LazyLock<Vec<LooseScan>> = LazyLock::new(|| {
    let scan = |reading, pattern: &str, order| LooseScan {
        reading,
        regex: Regex::new(pattern).unwrap(),
        order,
    };
    vec![
        scan("DD-MM-YYYY", r"([0-9]{2})[-._]([0-9]{2})[-._]([0-9]{4})", Order::DayMonthYear),
        scan("YYYY-MM-DD", r"([0-9]{4})[-._]([0-9]{2})[-._]([0-9]{2})", Order::YearMonthDay),
        scan("DDMMYYYY", r"([0-9]{2})([0-9]{2})([0-9]{4})", Order::DayMonthYear),
        scan("YYYYMMDD", r"([0-9]{4})([0-9]{2})([0-9]{2})", Order::YearMonthDay),
    ]
});

/// Runs of eight or more ASCII digits, read from their first eight bytes
static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]{8,}").unwrap());

/// Up to three distinct dates mined from a filename, in discovery order
pub fn suggest(filename: &str) -> Vec<Suggestion> {
    let stem = file_stem(filename);
    let mut found: Vec<Suggestion> = Vec::with_capacity(MAX_SUGGESTIONS);

    for scan in SCANS.iter() {
        for caps in scan.regex.captures_iter(stem) {
            let (Some(a), Some(b), Some(c)) = (caps.get(1), caps.get(2), caps.get(3)) else {
                continue;
            };
            let date = match scan.order {
                Order::DayMonthYear => plausible_date(c.as_str(), b.as_str(), a.as_str()),
                Order::YearMonthDay => plausible_date(a.as_str(), b.as_str(), c.as_str()),
            };
            if let Some(date) = date
                && push_unique(&mut found, date, scan.reading)
            {
                return found;
            }
        }
    }

    for run in DIGIT_RUN.find_iter(stem) {
        let digits = run.as_str();
        if let Some(date) = plausible_date(&digits[0..4], &digits[4..6], &digits[6..8])
            && push_unique(&mut found, date, "digit run")
        {
            return found;
        }
    }

    found
}

fn plausible_date(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let raw = RawDateTime::date_at_noon(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?);
    calendar::validate_in(&raw, YearWindow::suggestion())
        .ok()
        .map(|dt| dt.date())
}

/// Adds the date unless already present; true once the list is full
fn push_unique(found: &mut Vec<Suggestion>, date: NaiveDate, reading: &'static str) -> bool {
    if !found.iter().any(|s| s.date == date) {
        found.push(Suggestion { date, reading });
    }
    found.len() >= MAX_SUGGESTIONS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dates(name: &str) -> Vec<NaiveDate> {
        suggest(name).into_iter().map(|s| s.date).collect()
    }

    #[test]
    fn test_no_digits_no_suggestions() {
        assert!(suggest("my_video.mp4").is_empty());
        assert!(suggest("DSC_0001.jpg").is_empty());
    }

    #[test]
    fn test_day_month_year() {
        let found = suggest("party 25-12-2023.mp4");
        assert_eq!(found[0].date, date(2023, 12, 25));
        assert_eq!(found[0].reading, "DD-MM-YYYY");
    }

    #[test]
    fn test_same_date_is_listed_once() {
        // YYYYMMDD and the digit run read the same date
        let found = suggest("clip_20231225.mp4");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, date(2023, 12, 25));
        assert_eq!(found[0].reading, "YYYYMMDD");

        assert_eq!(dates("25.12.2023 copy 2023-12-25.jpg"), vec![date(2023, 12, 25)]);
    }

    #[test]
    fn test_discovery_order_across_scans() {
        // DD-MM-YYYY first, then YYYY-MM-DD, then compact forms
        let found = dates("01-02-2023_2023.03.04_05062023");
        assert_eq!(found, vec![date(2023, 2, 1), date(2023, 3, 4), date(2023, 6, 5)]);
    }

    #[test]
    fn test_capped_at_three() {
        let found = suggest("01-01-2021 02-02-2022 03-03-2023 04-04-2024.jpg");
        assert_eq!(found.len(), MAX_SUGGESTIONS);
        assert_eq!(found[2].date, date(2023, 3, 3));
    }

    #[test]
    fn test_wider_year_window() {
        assert_eq!(dates("scan_20950101.jpg"), vec![date(2095, 1, 1)]);
        assert!(suggest("scan_19991231.jpg").is_empty());
        assert!(suggest("scan_21010101.jpg").is_empty());
    }

    #[test]
    fn test_long_digit_run_uses_first_eight() {
        let found = suggest("x_2023122599.jpg");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].date, date(2023, 12, 25));
    }

    #[test]
    fn test_invalid_calendar_values_skipped() {
        assert!(suggest("31-02-2023.jpg").is_empty());
        assert_eq!(dates("29-02-2024.jpg"), vec![date(2024, 2, 29)]);
    }

    #[test]
    fn test_default_time_is_noon() {
        let found = suggest("25-12-2023.jpg");
        assert_eq!(found[0].at_default_time().to_string(), "2023-12-25 12:00:00");
    }

    #[test]
    fn test_non_ascii_digits_are_ignored() {
        assert!(suggest("photo_२०२३१२२५.jpg").is_empty());
        assert!(suggest("٢٥-١٢-٢٠٢٣.mp4").is_empty());
        assert!(suggest("ｆｏｔｏ_２０２３１２２５.jpg").is_empty());
    }

    #[test]
    fn test_non_ascii_around_ascii_digits() {
        assert_eq!(dates("Vidéo_२०२३_25-12-2023.mp4"), vec![date(2023, 12, 25)]);
        assert_eq!(dates("été२_20231225१.jpg"), vec![date(2023, 12, 25)]);
    }
}

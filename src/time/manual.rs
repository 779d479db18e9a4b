//! Operator-entered dates: `DD/MM/YYYY` or `DD/MM/YYYY HH:MM:SS`

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

/// Display format for dates shown to the operator
pub const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManualInputError {
    #[error("empty input")]
    Empty,
    #[error("'{0}' is not DD/MM/YYYY or DD/MM/YYYY HH:MM:SS")]
    Format(String),
}

/// Parse an operator date; a missing time means 12:00:00
pub fn parse_manual_datetime(input: &str) -> Result<NaiveDateTime, ManualInputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ManualInputError::Empty);
    }

    if input.contains(':') {
        return NaiveDateTime::parse_from_str(input, "%d/%m/%Y %H:%M:%S")
            .map_err(|_| ManualInputError::Format(input.to_string()));
    }

    let date = NaiveDate::parse_from_str(input, "%d/%m/%Y")
        .map_err(|_| ManualInputError::Format(input.to_string()))?;
    Ok(date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_and_time() {
        let dt = parse_manual_datetime("27/03/2021 09:26:58").unwrap();
        assert_eq!(dt.to_string(), "2021-03-27 09:26:58");
    }

    #[test]
    fn test_date_only_defaults_to_noon() {
        let dt = parse_manual_datetime(" 25/12/2023 ").unwrap();
        assert_eq!(dt.to_string(), "2023-12-25 12:00:00");
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(parse_manual_datetime(""), Err(ManualInputError::Empty));
        assert!(matches!(parse_manual_datetime("2023-12-25"), Err(ManualInputError::Format(_))));
        assert!(matches!(parse_manual_datetime("31/02/2023"), Err(ManualInputError::Format(_))));
        assert!(matches!(parse_manual_datetime("25/12/2023 25:00:00"), Err(ManualInputError::Format(_))));
        assert!(matches!(parse_manual_datetime("25/12/2023 14:30"), Err(ManualInputError::Format(_))));
        assert!(matches!(parse_manual_datetime("tomorrow"), Err(ManualInputError::Format(_))));
    }

    #[test]
    fn test_display_format_round_trips() {
        let dt = parse_manual_datetime("01/02/2024 03:04:05").unwrap();
        assert_eq!(dt.format(DISPLAY_FORMAT).to_string(), "01/02/2024 03:04:05");
    }
}

//! Filename pattern library
//!
//! Patterns are grouped into tiers. The extraction engine walks the tiers
//! in order and stops at the first tier holding a valid match, so the
//! table order below is the priority order.

use regex::Regex;
use std::sync::LazyLock;

/// Role of one capture group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

use Field::*;

const DATETIME: &[Field] = &[Year, Month, Day, Hour, Minute, Second];
const DATE: &[Field] = &[Year, Month, Day];

/// One filename shape: a regex and the meaning of its capture groups
#[derive(Debug)]
pub struct FilenamePattern {
    pub id: &'static str,
    /// A filename stem this pattern reads
    pub example: &'static str,
    pub regex: Regex,
    /// Capture group `n + 1` holds `fields[n]`
    pub fields: &'static [Field],
    pub carries_time: bool,
}

impl FilenamePattern {
    fn new(id: &'static str, example: &'static str, pattern: &str, fields: &'static [Field]) -> Self {
        let carries_time = fields.contains(&Hour);
        Self {
            id,
            example,
            regex: Regex::new(pattern).unwrap(),
            fields,
            carries_time,
        }
    }
}

/// Patterns tried together before falling back to the next tier
#[derive(Debug)]
pub struct PatternTier {
    pub name: &'static str,
    pub patterns: Vec<FilenamePattern>,
}

impl PatternTier {
    fn new(name: &'static str, patterns: Vec<FilenamePattern>) -> Self {
        Self { name, patterns }
    }

    pub fn carries_time(&self) -> bool {
        self.patterns.iter().all(|p| p.carries_time)
    }
}

/// Full date+time tiers, most specific first
pub static DATETIME_TIERS: LazyLock<Vec<PatternTier>> = LazyLock::new(|| {
    vec![
        PatternTier::new(
            "labeled",
            vec![
                // VID_20231225_143045, Vid 20210327 092658, MVIMG_...
                FilenamePattern::new(
                    "camera-label",
                    "VID_20231225_143045",
                    r"(?i)(?:video|vid|image|img|photo|pict|pic|mvimg|screen|recording|record)[ _-]*([0-9]{4})([0-9]{2})([0-9]{2})[ _-]*([0-9]{2})([0-9]{2})([0-9]{2})",
                    DATETIME,
                ),
                // IMG-20231225-WA143045
                FilenamePattern::new(
                    "whatsapp",
                    "IMG-20231225-WA143045",
                    r"(?i)(?:img|vid|ptt)-([0-9]{4})([0-9]{2})([0-9]{2})-wa([0-9]{2})([0-9]{2})([0-9]{2})",
                    DATETIME,
                ),
                // PXL_20231225_143045123
                FilenamePattern::new(
                    "pixel",
                    "PXL_20231225_143045123",
                    r"(?i)pxl[ _-]*([0-9]{4})([0-9]{2})([0-9]{2})[ _-]*([0-9]{2})([0-9]{2})([0-9]{2})",
                    DATETIME,
                ),
                // Screenshot_20231225-143045, Screenrecorder_2023...
                FilenamePattern::new(
                    "samsung",
                    "Screenshot_20231225-143045",
                    r"(?i)(?:screenshot|screenrecorder)[ _-]*([0-9]{4})([0-9]{2})([0-9]{2})[ _-]*([0-9]{2})([0-9]{2})([0-9]{2})",
                    DATETIME,
                ),
                FilenamePattern::new(
                    "huawei",
                    "HUAWEI_20231225_143045",
                    r"(?i)huawei[ _-]*([0-9]{4})([0-9]{2})([0-9]{2})[ _-]*([0-9]{2})([0-9]{2})([0-9]{2})",
                    DATETIME,
                ),
                FilenamePattern::new(
                    "xiaomi",
                    "MIUI_20231225_143045",
                    r"(?i)(?:miui|xiaomi)[ _-]*([0-9]{4})([0-9]{2})([0-9]{2})[ _-]*([0-9]{2})([0-9]{2})([0-9]{2})",
                    DATETIME,
                ),
            ],
        ),
        PatternTier::new(
            "underscore",
            vec![FilenamePattern::new(
                "YYYYMMDD_HHMMSS",
                "20231225_143045",
                r"([0-9]{4})([0-9]{2})([0-9]{2})_([0-9]{2})([0-9]{2})([0-9]{2})",
                DATETIME,
            )],
        ),
        PatternTier::new(
            "compact",
            vec![FilenamePattern::new(
                "YYYYMMDDHHMMSS",
                "20231225143045",
                r"([0-9]{4})([0-9]{2})([0-9]{2})([0-9]{2})([0-9]{2})([0-9]{2})",
                DATETIME,
            )],
        ),
        PatternTier::new(
            "dashed",
            vec![FilenamePattern::new(
                "YYYY-MM-DD HH-MM-SS",
                "2023-12-25 14-30-45",
                r"([0-9]{4})-([0-9]{2})-([0-9]{2})[ _]([0-9]{2})-([0-9]{2})-([0-9]{2})",
                DATETIME,
            )],
        ),
        PatternTier::new(
            "dotted",
            vec![FilenamePattern::new(
                "YYYY.MM.DD HH.MM.SS",
                "2023.12.25 14.30.45",
                r"([0-9]{4})\.([0-9]{2})\.([0-9]{2})[ _]([0-9]{2})\.([0-9]{2})\.([0-9]{2})",
                DATETIME,
            )],
        ),
    ]
});

/// Date-only tiers, tried when no datetime tier matched
pub static DATE_TIERS: LazyLock<Vec<PatternTier>> = LazyLock::new(|| {
    vec![
        PatternTier::new(
            "date-compact",
            vec![FilenamePattern::new(
                "YYYYMMDD",
                "holiday_20231225",
                r"([0-9]{4})([0-9]{2})([0-9]{2})",
                DATE,
            )],
        ),
        PatternTier::new(
            "date-dashed",
            vec![FilenamePattern::new(
                "YYYY-MM-DD",
                "holiday 2023-12-25",
                r"([0-9]{4})-([0-9]{2})-([0-9]{2})",
                DATE,
            )],
        ),
        PatternTier::new(
            "date-dotted",
            vec![FilenamePattern::new(
                "YYYY.MM.DD",
                "holiday 2023.12.25",
                r"([0-9]{4})\.([0-9]{2})\.([0-9]{2})",
                DATE,
            )],
        ),
    ]
});

/// Camera counters like DSC_0001 or IMG_1234 carry no date at all
static SEQUENCE_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:dsc[nf]?|img|mvi|vid|mov|dji|gopr|gp|p|sam|wp)[ _-]?[0-9]{1,6}(?:[ _-]?\([0-9]+\))?$")
        .unwrap()
});

/// Whether a stem is only a sequential counter
pub fn is_sequence_only(stem: &str) -> bool {
    SEQUENCE_ONLY.is_match(stem)
}

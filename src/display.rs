//! Console output for summaries, tool checks and filename tests

use crate::config::{Config, MediaKind};
use crate::process::{ProcessingStatus, RunSummary};
use crate::time::pattern::{DATE_TIERS, DATETIME_TIERS, PatternTier};
use crate::time::{self, DISPLAY_FORMAT};
use crate::tools::{Capabilities, ToolInfo, select_strategy};
use crossterm::{
    ExecutableCommand,
    style::{Color, Print, Stylize, style},
};
use rust_i18n::t;
use std::io::stdout;
use std::path::Path;

/// Most failures listed in the summary
const FAILED_SHOWN: usize = 5;

/// Theme colors
pub struct CliTheme;

impl CliTheme {
    pub const SUCCESS: Color = Color::Green;
    pub const WARNING: Color = Color::Yellow;
    pub const ERROR: Color = Color::Red;
    pub const HINT: Color = Color::DarkGrey;
    pub const ACCENT: Color = Color::Cyan;
}

pub fn print_separator() {
    let _ = stdout().execute(Print(format!("{}\n", "─".repeat(60))));
}

pub fn print_title(title: &str) {
    let _ = stdout().execute(Print(format!("{:^60}\n", title).bold()));
}

pub fn print_warning(msg: &str) {
    let _ = stdout().execute(Print(style("⚠ ").with(CliTheme::WARNING).bold()));
    let _ = stdout().execute(Print(format!("{}\n", msg)));
}

pub fn print_error(msg: &str) {
    let _ = stdout().execute(Print(style("✗ ").with(CliTheme::ERROR).bold()));
    let _ = stdout().execute(Print(format!("{}\n", msg)));
}

pub fn print_hint(msg: &str) {
    let _ = stdout().execute(Print(style("→ ").with(CliTheme::HINT)));
    let _ = stdout().execute(Print(format!("{}\n", msg)));
}

pub fn print_key_value(key: &str, value: &str, value_color: Option<Color>) {
    let key_styled = style(key).with(CliTheme::HINT);
    let value_styled = match value_color {
        Some(color) => style(value).with(color),
        None => style(value).bold(),
    };
    let _ = stdout().execute(Print("  "));
    let _ = stdout().execute(Print(key_styled));
    let _ = stdout().execute(Print(": "));
    let _ = stdout().execute(Print(value_styled));
    let _ = stdout().execute(Print("\n"));
}

pub fn print_stat(key: &str, value: usize, color: Color) {
    let _ = stdout().execute(Print("  "));
    let _ = stdout().execute(Print(style(key).with(CliTheme::HINT)));
    let _ = stdout().execute(Print(": "));
    let _ = stdout().execute(Print(style(value).with(color).bold()));
    let _ = stdout().execute(Print("\n"));
}

/// One line per file: icon, name, then destination or message
pub fn print_result(status_icon: &str, status_color: Color, source: &str, detail: &str) {
    let _ = stdout().execute(Print("  "));
    let _ = stdout().execute(Print(style(status_icon).with(status_color).bold()));
    let _ = stdout().execute(Print(" "));
    let _ = stdout().execute(Print(style(source).italic()));
    let _ = stdout().execute(Print(" "));
    let _ = stdout().execute(Print(style(detail).with(CliTheme::HINT)));
    let _ = stdout().execute(Print("\n"));
}

pub fn print_blank() {
    let _ = stdout().execute(Print("\n"));
}

/// Final statistics, per-directory problems and failed files
pub fn display_summary(summary: &RunSummary, verbose: bool, log_path: Option<&Path>) {
    let totals = summary.totals();

    print_separator();
    if summary.dry_run {
        print_title(&t!("dry_run_complete"));
    } else {
        print_title(&t!("processing_complete"));
    }
    print_separator();

    print_blank();
    print_stat(&t!("stat_total"), totals.total_files, CliTheme::ACCENT);
    print_stat(&t!("stat_processed"), totals.processed, CliTheme::SUCCESS);
    print_stat(&t!("stat_skipped"), totals.skipped_total(), CliTheme::WARNING);
    print_stat(&t!("stat_failed"), totals.failed, CliTheme::ERROR);
    print_blank();

    for dir in &summary.directories {
        let input = dir.input_dir.display().to_string();
        if dir.missing {
            print_warning(&t!("directory_missing", path = input));
            continue;
        }
        if let Some(error) = &dir.error {
            print_error(&t!("directory_aborted", path = input, error = error));
            continue;
        }
        print_key_value(&t!("output_directory"), &dir.output_dir.display().to_string(), Some(CliTheme::SUCCESS));

        if verbose {
            for result in &dir.results {
                let when = result
                    .timestamp
                    .map(|ts| ts.format(DISPLAY_FORMAT).to_string())
                    .unwrap_or_default();
                match result.status {
                    ProcessingStatus::Processed => {
                        print_result("✓", CliTheme::SUCCESS, &result.file_name(), &format!("→ {when}"))
                    }
                    ProcessingStatus::DryRun => {
                        print_result("~", CliTheme::ACCENT, &result.file_name(), &format!("→ {when}"))
                    }
                    ProcessingStatus::Skipped => print_result("⊘", CliTheme::WARNING, &result.file_name(), ""),
                    ProcessingStatus::Failed => print_result(
                        "✗",
                        CliTheme::ERROR,
                        &result.file_name(),
                        result.error.as_deref().unwrap_or_default(),
                    ),
                }
            }
        }
    }

    let failed: Vec<_> = summary.directories.iter().flat_map(|d| d.failures()).collect();
    if !failed.is_empty() {
        let unknown_error = t!("unknown_error");
        print_separator();
        print_error(&t!("failed_files"));
        for result in failed.iter().take(FAILED_SHOWN) {
            print_key_value(
                &result.file_name(),
                result.error.as_deref().unwrap_or(&unknown_error),
                Some(CliTheme::ERROR),
            );
        }
        if failed.len() > FAILED_SHOWN {
            print_hint(&t!("failed_files_more", count = failed.len() - FAILED_SHOWN));
        }
    }

    if summary.dry_run {
        print_separator();
        print_warning(&t!("dry_run_notice"));
    }

    if let Some(path) = log_path {
        print_separator();
        print_key_value(&t!("log_file"), &path.display().to_string(), None);
    }
}

/// Found tools and the strategy each media kind will use
pub fn display_capabilities(caps: &Capabilities, config: &Config) {
    let describe = |tool: &Option<ToolInfo>| match tool {
        Some(info) => (
            t!("tool_found", version = info.version, path = info.path.display().to_string()).to_string(),
            CliTheme::SUCCESS,
        ),
        None => (t!("tool_missing").to_string(), CliTheme::WARNING),
    };

    print_separator();
    print_title(&t!("tools_title"));
    print_separator();
    let (exiftool, color) = describe(&caps.exiftool);
    print_key_value("exiftool", &exiftool, Some(color));
    let (ffmpeg, color) = describe(&caps.ffmpeg);
    print_key_value("ffmpeg", &ffmpeg, Some(color));
    print_blank();
    print_key_value(
        &t!("strategy_for_video"),
        select_strategy(config.tool, MediaKind::Video, caps).name(),
        Some(CliTheme::ACCENT),
    );
    print_key_value(
        &t!("strategy_for_photo"),
        select_strategy(config.tool, MediaKind::Photo, caps).name(),
        Some(CliTheme::ACCENT),
    );
}

/// What extraction and suggestions make of one filename
pub fn display_filename_test(filename: &str, config: &Config) {
    let kind = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .and_then(|ext| config.media_kind(ext))
        .unwrap_or(MediaKind::Photo);

    match time::extract(filename, kind) {
        Some(found) => {
            let when = found.timestamp.format(DISPLAY_FORMAT).to_string();
            let line = if found.carries_time {
                t!("test_detected", datetime = when, pattern = found.pattern)
            } else {
                t!("test_detected_date_only", datetime = when, pattern = found.pattern)
            };
            print_result("✓", CliTheme::SUCCESS, filename, &line);
        }
        None => {
            print_result("?", CliTheme::WARNING, filename, &t!("test_no_match"));
            let suggestions = time::suggest(filename);
            if !suggestions.is_empty() {
                print_hint(&t!("test_suggestions"));
                for s in &suggestions {
                    print_key_value(s.reading, &s.date.format("%d/%m/%Y").to_string(), Some(CliTheme::ACCENT));
                }
            }
        }
    }
}

/// Every filename format extraction understands, in priority order
pub fn display_formats() {
    print_separator();
    print_title(&t!("formats_title"));
    print_separator();
    print_hint(&t!("formats_datetime"));
    print_tiers(&DATETIME_TIERS);
    print_blank();
    print_hint(&t!("formats_date_only"));
    print_tiers(&DATE_TIERS);
    print_blank();
    print_hint(&t!("formats_manual"));
    print_key_value("DD/MM/YYYY", "25/12/2023", Some(CliTheme::ACCENT));
    print_key_value("DD/MM/YYYY HH:MM:SS", "25/12/2023 14:30:45", Some(CliTheme::ACCENT));
}

fn print_tiers(tiers: &[PatternTier]) {
    for tier in tiers {
        for pattern in &tier.patterns {
            print_key_value(pattern.id, pattern.example, Some(CliTheme::ACCENT));
        }
    }
}

pub fn display_report_written(path: &Path) {
    print_hint(&t!("report_written", path = path.display().to_string()));
}

pub fn display_interrupted() {
    print_blank();
    print_warning(&t!("interrupted"));
}

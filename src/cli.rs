//! CLI argument parsing with clap

use crate::config::{Config, MediaFilter, ProcessingMode, ToolChoice};
use crate::time::parse_manual_datetime;
use chrono::NaiveDateTime;
use clap::Parser;
use std::path::PathBuf;

/// Meta Time Changer - retimestamp photos and videos from their filenames
///
/// Reads the capture date and time encoded in camera, phone and app
/// filenames, writes it into the file's metadata (ExifTool or FFmpeg when
/// available, file timestamps otherwise) and places the result in an
/// output folder. Run without arguments for a guided setup.
#[derive(Parser, Debug)]
#[command(name = "meta-time-changer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file (TOML format)
    ///
    /// When specified, settings from the config file are used as defaults.
    /// CLI arguments will override config file settings.
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Input directories to scan for media files (not recursive)
    #[arg(short, long, num_args = 1..)]
    pub input: Option<Vec<PathBuf>>,

    /// Output directory; defaults to `<input>_updated` beside each input
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// How datetimes are decided:
    /// - auto: from the filename, ask only when nothing is found (default)
    /// - confirm: from the filename, confirm every file
    /// - batch: one datetime for every file
    #[arg(short = 'M', long, value_enum)]
    pub mode: Option<ProcessingMode>,

    /// Tool that writes the datetime (downgraded when not installed)
    #[arg(short = 'T', long, value_enum)]
    pub tool: Option<ToolChoice>,

    /// Which media kinds to process
    #[arg(short = 'k', long, value_enum)]
    pub media: Option<MediaFilter>,

    /// Datetime for batch mode: DD/MM/YYYY or "DD/MM/YYYY HH:MM:SS"
    #[arg(long, value_parser = parse_manual_datetime)]
    pub batch_date: Option<NaiveDateTime>,

    /// Never prompt: accept detected dates and skip everything else
    #[arg(long)]
    pub no_prompt: bool,

    /// Dry run mode - show what would be done without doing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Output log format as JSON
    #[arg(long)]
    pub json_log: bool,

    /// Console language (en, id); system language when omitted
    #[arg(long, env = "META_TIME_CHANGER_LANG")]
    pub lang: Option<String>,

    /// Write a JSON report of the run to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Show which external tools were found, then exit
    #[arg(long)]
    pub check_tools: bool,

    /// Show what would be extracted from these filenames, then exit
    #[arg(long, num_args = 1.., value_name = "FILENAME")]
    pub test: Option<Vec<String>>,

    /// List the supported filename formats, then exit
    #[arg(long)]
    pub formats: bool,

    /// Print a sample configuration file, then exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Get config file name (without extension) for log naming
    pub fn config_name(&self) -> Option<String> {
        self.config.as_ref().and_then(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })
    }

    /// Merge CLI arguments with config from file
    /// CLI arguments take precedence over config file settings
    pub fn merge_with_config(&self, mut config: Config) -> Config {
        if let Some(ref inputs) = self.input {
            config.input_dirs = inputs.clone();
        }
        if let Some(ref output) = self.output {
            config.output_dir = Some(output.clone());
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(tool) = self.tool {
            config.tool = tool;
        }
        if let Some(media) = self.media {
            config.media = media;
        }
        if self.dry_run {
            config.dry_run = true;
        }
        if self.verbose {
            config.verbose = true;
        }
        if let Some(ref lang) = self.lang {
            config.language = Some(lang.clone());
        }

        config
    }

    /// Convert CLI arguments to Config (when no config file is used)
    pub fn to_config(&self) -> Config {
        self.merge_with_config(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "meta-time-changer",
            "-i",
            "a",
            "b",
            "-o",
            "out",
            "-M",
            "confirm",
            "-T",
            "ffmpeg",
            "-k",
            "video",
            "--batch-date",
            "25/12/2023 08:00:00",
            "-n",
        ])
        .unwrap();

        let config = cli.to_config();
        assert_eq!(config.input_dirs, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(config.output_dir, Some(PathBuf::from("out")));
        assert_eq!(config.mode, ProcessingMode::Confirm);
        assert_eq!(config.tool, ToolChoice::Ffmpeg);
        assert_eq!(config.media, MediaFilter::Video);
        assert!(config.dry_run);
        assert_eq!(cli.batch_date.unwrap().to_string(), "2023-12-25 08:00:00");
    }

    #[test]
    fn test_bad_batch_date_is_rejected() {
        assert!(Cli::try_parse_from(["meta-time-changer", "--batch-date", "2023-12-25"]).is_err());
    }

    #[test]
    fn test_cli_overrides_file_config() {
        let file = Config {
            input_dirs: vec![PathBuf::from("from-file")],
            mode: ProcessingMode::Batch,
            tool: ToolChoice::Exiftool,
            ..Config::default()
        };
        let cli = Cli::try_parse_from(["meta-time-changer", "-T", "basic"]).unwrap();
        let merged = cli.merge_with_config(file);

        assert_eq!(merged.input_dirs, vec![PathBuf::from("from-file")]);
        assert_eq!(merged.mode, ProcessingMode::Batch);
        assert_eq!(merged.tool, ToolChoice::Basic);
    }

    #[test]
    fn test_formats_flag() {
        let cli = Cli::try_parse_from(["meta-time-changer", "--formats"]).unwrap();
        assert!(cli.formats);
        assert!(!Cli::try_parse_from(["meta-time-changer"]).unwrap().formats);
    }

    #[test]
    fn test_config_name() {
        let cli = Cli::try_parse_from(["meta-time-changer", "-C", "configs/phone.toml"]).unwrap();
        assert_eq!(cli.config_name().as_deref(), Some("phone"));
    }
}

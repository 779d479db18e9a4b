//! External tools that write a datetime into media files
//!
//! Three strategies, from richest to plainest:
//! - ExifTool edits tags in place
//! - FFmpeg remuxes a video into the output directory with new creation metadata
//! - File system access/modification times only
//!
//! Which tools exist is probed once per run. The strategy for each media
//! kind is then fixed for the whole run.

pub mod command;
pub mod exiftool;
pub mod ffmpeg;
pub mod timestamp;

pub use exiftool::ExifToolWriter;
pub use ffmpeg::RemuxWriter;
pub use timestamp::{TimestampWriter, set_times};

use crate::config::{Config, MediaKind, ToolChoice};
use crate::error::Result;
use chrono::NaiveDateTime;
use command::run_with_timeout;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One file to retimestamp
#[derive(Debug, Clone, Copy)]
pub struct WriteJob<'a> {
    pub path: &'a Path,
    pub timestamp: NaiveDateTime,
    pub kind: MediaKind,
    /// Where a writer that produces a new file puts it
    pub output_dir: &'a Path,
}

/// Where the updated media ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The source file itself was updated
    InPlace,
    /// A new file was written to this path
    Produced(PathBuf),
}

pub trait MetadataWriter {
    /// Short name for logs and the summary
    fn name(&self) -> &'static str;

    fn apply(&self, job: &WriteJob<'_>) -> Result<WriteOutcome>;
}

/// A located tool and the version it reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolInfo {
    pub path: PathBuf,
    pub version: String,
}

/// Which tools this machine has
#[derive(Debug, Clone, Default, Serialize)]
pub struct Capabilities {
    pub exiftool: Option<ToolInfo>,
    pub ffmpeg: Option<ToolInfo>,
}

impl Capabilities {
    /// Look for both tools and ask each for its version
    pub fn probe(config: &Config) -> Self {
        let caps = Self {
            exiftool: probe_tool("exiftool", config.exiftool_path.as_deref(), "-ver", config.probe_timeout()),
            ffmpeg: probe_tool("ffmpeg", config.ffmpeg_path.as_deref(), "-version", config.probe_timeout()),
        };
        info!(
            exiftool = caps.exiftool.as_ref().map(|t| t.version.as_str()),
            ffmpeg = caps.ffmpeg.as_ref().map(|t| t.version.as_str()),
            "Probed tools"
        );
        caps
    }

    /// No tools at all; every file falls back to file timestamps
    pub fn none() -> Self {
        Self::default()
    }
}

/// Longest version string kept from a tool's banner
const VERSION_MAX_CHARS: usize = 50;

fn probe_tool(name: &'static str, explicit: Option<&Path>, version_arg: &str, timeout: Duration) -> Option<ToolInfo> {
    let path = match explicit {
        Some(path) if path.is_file() => path.to_path_buf(),
        Some(path) => {
            warn!(tool = name, ?path, "Configured tool path does not exist, searching PATH");
            which::which(name).ok()?
        }
        None => match which::which(name) {
            Ok(path) => path,
            Err(e) => {
                debug!(tool = name, error = %e, "Not found on PATH");
                return None;
            }
        },
    };

    let mut command = Command::new(&path);
    command.arg(version_arg);
    match run_with_timeout(name, command, timeout) {
        Ok(output) if output.success() => {
            let version = output
                .stdout
                .lines()
                .next()
                .unwrap_or_default()
                .trim()
                .chars()
                .take(VERSION_MAX_CHARS)
                .collect();
            Some(ToolInfo { path, version })
        }
        Ok(output) => {
            warn!(tool = name, ?path, error = %output.error_line(), "Version probe failed");
            None
        }
        Err(e) => {
            warn!(tool = name, ?path, error = %e, "Version probe failed");
            None
        }
    }
}

/// How files of one kind get their datetime written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    ExifTool,
    Remux,
    Timestamp,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::ExifTool => "exiftool",
            Strategy::Remux => "ffmpeg",
            Strategy::Timestamp => "basic",
        }
    }
}

/// Best available strategy at or below the requested one
///
/// The order is ExifTool, then remux (videos only), then file timestamps.
pub fn select_strategy(choice: ToolChoice, kind: MediaKind, caps: &Capabilities) -> Strategy {
    let exiftool = caps.exiftool.is_some();
    let remux = kind == MediaKind::Video && caps.ffmpeg.is_some();

    match choice {
        ToolChoice::Auto | ToolChoice::Exiftool if exiftool => Strategy::ExifTool,
        ToolChoice::Auto | ToolChoice::Exiftool | ToolChoice::Ffmpeg if remux => Strategy::Remux,
        _ => Strategy::Timestamp,
    }
}

/// Requested strategy, before availability is considered
fn requested(choice: ToolChoice) -> Option<Strategy> {
    match choice {
        ToolChoice::Auto => None,
        ToolChoice::Exiftool => Some(Strategy::ExifTool),
        ToolChoice::Ffmpeg => Some(Strategy::Remux),
        ToolChoice::Basic => Some(Strategy::Timestamp),
    }
}

/// The writers chosen for one run
pub struct Toolbox {
    video: Box<dyn MetadataWriter>,
    photo: Box<dyn MetadataWriter>,
}

impl Toolbox {
    /// Pick a writer per media kind, warning once about any downgrade
    pub fn new(config: &Config, caps: &Capabilities) -> Self {
        let writer_for = |kind: MediaKind| {
            let strategy = select_strategy(config.tool, kind, caps);
            if let Some(wanted) = requested(config.tool)
                && wanted != strategy
            {
                warn!(
                    ?kind,
                    wanted = wanted.name(),
                    using = strategy.name(),
                    "Requested tool is not usable, falling back"
                );
            }
            info!(?kind, strategy = strategy.name(), "Selected writer");
            build_writer(strategy, config, caps)
        };
        Self {
            video: writer_for(MediaKind::Video),
            photo: writer_for(MediaKind::Photo),
        }
    }

    /// Use the given writers regardless of what is installed
    pub fn with_writers(video: Box<dyn MetadataWriter>, photo: Box<dyn MetadataWriter>) -> Self {
        Self { video, photo }
    }

    pub fn writer(&self, kind: MediaKind) -> &dyn MetadataWriter {
        match kind {
            MediaKind::Video => self.video.as_ref(),
            MediaKind::Photo => self.photo.as_ref(),
        }
    }
}

fn build_writer(strategy: Strategy, config: &Config, caps: &Capabilities) -> Box<dyn MetadataWriter> {
    match (strategy, &caps.exiftool, &caps.ffmpeg) {
        (Strategy::ExifTool, Some(tool), _) => Box::new(ExifToolWriter::new(tool.path.clone(), config.tag_timeout())),
        (Strategy::Remux, _, Some(tool)) => Box::new(RemuxWriter::new(tool.path.clone(), config.remux_timeout())),
        _ => Box::new(TimestampWriter),
    }
}

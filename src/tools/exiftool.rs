//! In-place tag edits through ExifTool

use super::command::run_with_timeout;
use super::{MetadataWriter, WriteJob, WriteOutcome};
use crate::config::MediaKind;
use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;
use tracing::debug;

/// Date format ExifTool expects in tag assignments
pub const EXIF_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

const VIDEO_TAGS: &[&str] = &[
    "CreateDate",
    "ModifyDate",
    "MediaCreateDate",
    "MediaModifyDate",
    "TrackCreateDate",
    "TrackModifyDate",
    "DateTimeOriginal",
];

const PHOTO_TAGS: &[&str] = &["AllDates", "DateTimeOriginal", "CreateDate", "ModifyDate"];

/// Arguments for one ExifTool invocation, without the file path
pub fn tag_args(kind: MediaKind, dt: NaiveDateTime) -> Vec<String> {
    let stamp = dt.format(EXIF_FORMAT).to_string();
    let tags = match kind {
        MediaKind::Video => VIDEO_TAGS,
        MediaKind::Photo => PHOTO_TAGS,
    };

    let mut args = Vec::with_capacity(tags.len() + 2);
    args.push("-overwrite_original".to_string());
    args.extend(tags.iter().map(|tag| format!("-{tag}={stamp}")));
    args.push("-FileModifyDate<DateTimeOriginal".to_string());
    args
}

#[derive(Debug, Clone)]
pub struct ExifToolWriter {
    program: PathBuf,
    timeout: Duration,
}

impl ExifToolWriter {
    pub fn new(program: PathBuf, timeout: Duration) -> Self {
        Self { program, timeout }
    }
}

impl MetadataWriter for ExifToolWriter {
    fn name(&self) -> &'static str {
        "exiftool"
    }

    fn apply(&self, job: &WriteJob<'_>) -> Result<WriteOutcome> {
        let mut command = Command::new(&self.program);
        command.args(tag_args(job.kind, job.timestamp)).arg(job.path);

        let output = run_with_timeout("exiftool", command, self.timeout)?;
        if !output.success() {
            return Err(Error::Tool {
                tool: "exiftool",
                path: job.path.to_path_buf(),
                message: output.error_line(),
            });
        }
        debug!(path = ?job.path, stdout = output.stdout.trim(), "ExifTool updated tags");
        Ok(WriteOutcome::InPlace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 12, 25).unwrap().and_hms_opt(14, 30, 45).unwrap()
    }

    #[test]
    fn test_video_args() {
        let args = tag_args(MediaKind::Video, dt());
        assert_eq!(args.first().map(String::as_str), Some("-overwrite_original"));
        assert_eq!(args.last().map(String::as_str), Some("-FileModifyDate<DateTimeOriginal"));
        assert!(args.contains(&"-MediaCreateDate=2023:12:25 14:30:45".to_string()));
        assert!(args.contains(&"-TrackModifyDate=2023:12:25 14:30:45".to_string()));
        assert_eq!(args.len(), VIDEO_TAGS.len() + 2);
    }

    #[test]
    fn test_photo_args() {
        let args = tag_args(MediaKind::Photo, dt());
        assert_eq!(
            args,
            vec![
                "-overwrite_original",
                "-AllDates=2023:12:25 14:30:45",
                "-DateTimeOriginal=2023:12:25 14:30:45",
                "-CreateDate=2023:12:25 14:30:45",
                "-ModifyDate=2023:12:25 14:30:45",
                "-FileModifyDate<DateTimeOriginal",
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_tool_error() {
        use tempfile::TempDir;

        let tmp = TempDir::new().unwrap();
        let media = tmp.path().join("a.jpg");
        std::fs::write(&media, b"x").unwrap();

        // `false` ignores its arguments and exits 1
        let writer = ExifToolWriter::new(PathBuf::from("false"), Duration::from_secs(5));
        let job = WriteJob {
            path: &media,
            timestamp: dt(),
            kind: MediaKind::Photo,
            output_dir: tmp.path(),
        };
        match writer.apply(&job) {
            Err(Error::Tool { tool, path, .. }) => {
                assert_eq!(tool, "exiftool");
                assert_eq!(path, media);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}

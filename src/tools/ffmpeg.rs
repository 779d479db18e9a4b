//! Video remux through FFmpeg
//!
//! Streams are copied untouched into a new container whose creation
//! metadata carries the new datetime. The result is written straight into
//! the output directory, so the source file is never modified.

use super::command::run_with_timeout;
use super::timestamp::set_times;
use super::{MetadataWriter, WriteJob, WriteOutcome};
use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::{debug, warn};

const TEMP_PREFIX: &str = "temp_";

/// Arguments for one remux of `source` into `target`
pub fn remux_args(source: &Path, target: &Path, dt: NaiveDateTime) -> Vec<OsString> {
    let iso = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
    let date = dt.format("%Y-%m-%d").to_string();

    let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-nostdin", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(source.as_os_str().to_owned());
    for meta in [
        format!("creation_time={iso}"),
        format!("date={date}"),
        format!("creation_date={iso}"),
    ] {
        args.push("-metadata".into());
        args.push(meta.into());
    }
    args.extend(["-movflags", "use_metadata_tags", "-c", "copy", "-y"].map(OsString::from));
    args.push(target.as_os_str().to_owned());
    args
}

/// A file in the output directory that is removed unless kept
struct TempArtifact {
    path: PathBuf,
    keep: bool,
}

impl TempArtifact {
    fn new(path: PathBuf) -> Self {
        Self { path, keep: false }
    }

    /// Move into place, after which drop leaves it alone
    fn persist(mut self, target: &Path) -> Result<()> {
        if target.exists() {
            fs::remove_file(target)?;
        }
        fs::rename(&self.path, target)?;
        self.keep = true;
        Ok(())
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if !self.keep
            && self.path.exists()
            && let Err(e) = fs::remove_file(&self.path)
        {
            warn!(path = ?self.path, error = %e, "Failed to remove temporary remux output");
        }
    }
}

#[derive(Debug, Clone)]
pub struct RemuxWriter {
    program: PathBuf,
    timeout: Duration,
}

impl RemuxWriter {
    pub fn new(program: PathBuf, timeout: Duration) -> Self {
        Self { program, timeout }
    }
}

impl MetadataWriter for RemuxWriter {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    fn apply(&self, job: &WriteJob<'_>) -> Result<WriteOutcome> {
        let Some(name) = job.path.file_name() else {
            return Err(Error::Tool {
                tool: "ffmpeg",
                path: job.path.to_path_buf(),
                message: "path has no file name".into(),
            });
        };

        fs::create_dir_all(job.output_dir)?;
        let target = job.output_dir.join(name);
        let mut temp_name = OsString::from(TEMP_PREFIX);
        temp_name.push(name);
        let temp = TempArtifact::new(job.output_dir.join(temp_name));

        let mut command = Command::new(&self.program);
        command.args(remux_args(job.path, &temp.path, job.timestamp));
        let output = run_with_timeout("ffmpeg", command, self.timeout)?;

        if !output.success() {
            return Err(Error::Tool {
                tool: "ffmpeg",
                path: job.path.to_path_buf(),
                message: output.error_line(),
            });
        }
        let produced = fs::metadata(&temp.path).map(|m| m.len()).unwrap_or(0);
        if produced == 0 {
            return Err(Error::Tool {
                tool: "ffmpeg",
                path: job.path.to_path_buf(),
                message: "remux produced no output".into(),
            });
        }

        temp.persist(&target)?;
        debug!(source = ?job.path, ?target, bytes = produced, "Remuxed");
        Ok(stamp_output(target, job.timestamp))
    }
}

/// Set file times on a finished remux
///
/// The container already carries the new datetime, so a failure here only
/// costs the file times and the output is still reported.
fn stamp_output(target: PathBuf, timestamp: NaiveDateTime) -> WriteOutcome {
    if let Err(e) = set_times(&target, timestamp) {
        warn!(?target, error = %e, "Remuxed file kept without updated file times");
    }
    WriteOutcome::Produced(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MediaKind;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn dt() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 12, 25).unwrap().and_hms_opt(14, 30, 45).unwrap()
    }

    #[test]
    fn test_stamp_output() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("clip.mp4");
        fs::write(&target, b"remuxed").unwrap();

        let outcome = stamp_output(target.clone(), dt());
        assert!(matches!(outcome, WriteOutcome::Produced(ref p) if *p == target));
        let mtime = filetime::FileTime::from_last_modification_time(&fs::metadata(&target).unwrap());
        assert_eq!(mtime.unix_seconds(), crate::tools::timestamp::local_unix_seconds(dt()));
    }

    #[test]
    fn test_stamp_failure_still_reports_output() {
        let tmp = TempDir::new().unwrap();
        let gone = tmp.path().join("vanished.mp4");

        let outcome = stamp_output(gone.clone(), dt());
        assert!(matches!(outcome, WriteOutcome::Produced(ref p) if *p == gone));
    }

    #[test]
    fn test_remux_args() {
        let args = remux_args(Path::new("in/clip.mp4"), Path::new("out/temp_clip.mp4"), dt());
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();

        let input = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[input + 1], "in/clip.mp4");
        assert!(args.contains(&"creation_time=2023-12-25T14:30:45".to_string()));
        assert!(args.contains(&"date=2023-12-25".to_string()));
        assert!(args.contains(&"creation_date=2023-12-25T14:30:45".to_string()));
        assert!(args.windows(2).any(|w| w == ["-c", "copy"]));
        assert!(args.contains(&"-nostdin".to_string()));
        assert_eq!(args.last().unwrap(), "out/temp_clip.mp4");
    }

    #[test]
    fn test_temp_artifact_removed_unless_persisted() {
        let tmp = TempDir::new().unwrap();
        let dropped = tmp.path().join("temp_a.mp4");
        fs::write(&dropped, b"partial").unwrap();
        drop(TempArtifact::new(dropped.clone()));
        assert!(!dropped.exists());

        let kept = tmp.path().join("temp_b.mp4");
        let target = tmp.path().join("b.mp4");
        fs::write(&kept, b"done").unwrap();
        fs::write(&target, b"stale").unwrap();
        TempArtifact::new(kept.clone()).persist(&target).unwrap();
        assert!(!kept.exists());
        assert_eq!(fs::read(&target).unwrap(), b"done");
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_remux_leaves_nothing_behind() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("clip.mp4");
        fs::write(&input, b"not really a video").unwrap();
        let out = tmp.path().join("out");

        let writer = RemuxWriter::new(PathBuf::from("false"), Duration::from_secs(5));
        let job = WriteJob {
            path: &input,
            timestamp: dt(),
            kind: MediaKind::Video,
            output_dir: &out,
        };
        assert!(matches!(writer.apply(&job), Err(Error::Tool { tool: "ffmpeg", .. })));
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_empty_output_is_failure() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("clip.mp4");
        fs::write(&input, b"x").unwrap();
        let out = tmp.path().join("out");

        // `true` succeeds without writing the target
        let writer = RemuxWriter::new(PathBuf::from("true"), Duration::from_secs(5));
        let job = WriteJob {
            path: &input,
            timestamp: dt(),
            kind: MediaKind::Video,
            output_dir: &out,
        };
        assert!(writer.apply(&job).is_err());
        assert!(!out.join("clip.mp4").exists());
    }
}

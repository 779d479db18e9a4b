//! File system timestamps, the strategy that always works

use super::{MetadataWriter, WriteJob, WriteOutcome};
use crate::error::{Error, Result};
use chrono::{Local, NaiveDateTime, TimeZone};
use filetime::FileTime;
use std::path::Path;
use tracing::debug;

/// Seconds since the epoch for a wall-clock datetime in the local zone
///
/// Ambiguous local times (clock set back) take the earlier instant; times
/// that don't exist locally (clock set forward) are read as UTC.
pub fn local_unix_seconds(dt: NaiveDateTime) -> i64 {
    match Local.from_local_datetime(&dt).earliest() {
        Some(local) => local.timestamp(),
        None => dt.and_utc().timestamp(),
    }
}

/// Set both access and modification time of `path` to `dt`
pub fn set_times(path: &Path, dt: NaiveDateTime) -> Result<()> {
    let ft = FileTime::from_unix_time(local_unix_seconds(dt), 0);
    filetime::set_file_times(path, ft, ft).map_err(|e| Error::Timestamp {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!(?path, %dt, "Set file times");
    Ok(())
}

/// Writes nothing into the file, only its access and modification times
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampWriter;

impl MetadataWriter for TimestampWriter {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn apply(&self, job: &WriteJob<'_>) -> Result<WriteOutcome> {
        set_times(job.path, job.timestamp)?;
        Ok(WriteOutcome::InPlace)
    }
}

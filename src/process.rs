//! Main file processor
//!
//! Handles the core logic of:
//! - Listing eligible media in each input directory
//! - Deciding a datetime per file (filename, operator, batch override)
//! - Writing it with the selected tool
//! - Copying the result into the output directory

use crate::config::{Config, MediaKind, ProcessingMode, same_location};
use crate::error::{Error, Result};
use crate::resolve::{DecisionRequest, Resolution, Resolver};
use crate::time::{self, DISPLAY_FORMAT, TimeSource};
use crate::tools::{Toolbox, WriteJob, WriteOutcome};
use chrono::NaiveDateTime;
use filetime::FileTime;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{Level, debug, error, info, span, warn};
use walkdir::WalkDir;

/// Result of processing a single file
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    /// Source file path
    pub source: PathBuf,
    /// Where the updated file is (or would be)
    pub destination: Option<PathBuf>,
    /// Applied datetime
    pub timestamp: Option<NaiveDateTime>,
    pub time_source: Option<TimeSource>,
    /// Writer that applied it
    pub writer: Option<&'static str>,
    pub status: ProcessingStatus,
    /// Error message (if failed)
    pub error: Option<String>,
}

impl FileResult {
    fn new(source: &Path, status: ProcessingStatus) -> Self {
        Self {
            source: source.to_path_buf(),
            destination: None,
            timestamp: None,
            time_source: None,
            writer: None,
            status,
            error: None,
        }
    }

    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    }
}

/// Status of file processing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Datetime written and file placed in the output directory
    Processed,
    /// Operator skipped it, or no datetime could be decided
    Skipped,
    /// Writing or copying failed
    Failed,
    /// Dry run - would have processed
    DryRun,
}

/// Processing statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingStats {
    pub total_files: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, status: ProcessingStatus) {
        match status {
            ProcessingStatus::Processed | ProcessingStatus::DryRun => self.processed += 1,
            ProcessingStatus::Skipped => self.skipped += 1,
            ProcessingStatus::Failed => self.failed += 1,
        }
    }

    /// Files that were not updated, failures included
    pub fn skipped_total(&self) -> usize {
        self.skipped + self.failed
    }

    fn add(&mut self, other: &ProcessingStats) {
        self.total_files += other.total_files;
        self.processed += other.processed;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    pub fn summary(&self) -> String {
        format!(
            "Total: {}, Processed: {}, Skipped: {}, Failed: {}",
            self.total_files,
            self.processed,
            self.skipped_total(),
            self.failed
        )
    }
}

/// Outcome of one input directory
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryRun {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub stats: ProcessingStats,
    pub results: Vec<FileResult>,
    /// The input directory did not exist
    pub missing: bool,
    /// Why the directory run stopped early
    pub error: Option<String>,
}

impl DirectoryRun {
    fn new(input_dir: &Path, output_dir: PathBuf) -> Self {
        Self {
            input_dir: input_dir.to_path_buf(),
            output_dir,
            stats: ProcessingStats::new(),
            results: Vec::new(),
            missing: false,
            error: None,
        }
    }

    fn push(&mut self, result: FileResult) {
        self.stats.record(result.status);
        self.results.push(result);
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileResult> {
        self.results.iter().filter(|r| r.status == ProcessingStatus::Failed)
    }
}

/// Everything a run did, printable and serializable as a report
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub dry_run: bool,
    pub directories: Vec<DirectoryRun>,
}

impl RunSummary {
    pub fn totals(&self) -> ProcessingStats {
        let mut totals = ProcessingStats::new();
        for dir in &self.directories {
            totals.add(&dir.stats);
        }
        totals
    }

    /// True when every requested directory was missing
    pub fn all_missing(&self) -> bool {
        !self.directories.is_empty() && self.directories.iter().all(|d| d.missing)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Walks input directories and retimestamps what it finds
pub struct Processor<'a, R: Resolver> {
    config: &'a Config,
    toolbox: &'a Toolbox,
    resolver: &'a mut R,
}

impl<'a, R: Resolver> Processor<'a, R> {
    pub fn new(config: &'a Config, toolbox: &'a Toolbox, resolver: &'a mut R) -> Self {
        Self {
            config,
            toolbox,
            resolver,
        }
    }

    /// Process every input directory in order
    ///
    /// A directory that can't be processed is recorded and the run moves
    /// on; only an operator interrupt stops the whole run.
    pub fn run(&mut self) -> Result<RunSummary> {
        let _span = span!(Level::INFO, "processor_run").entered();
        let config = self.config;
        let mut directories = Vec::with_capacity(config.input_dirs.len());

        for input_dir in &config.input_dirs {
            let output_dir = config.output_dir_for(input_dir);
            match self.run_directory(input_dir, &output_dir) {
                Ok(run) => {
                    info!(?input_dir, stats = %run.stats.summary(), "Directory done");
                    directories.push(run);
                }
                Err(Error::Interrupted) => return Err(Error::Interrupted),
                Err(e) => {
                    error!(?input_dir, error = %e, "Directory aborted");
                    let mut run = DirectoryRun::new(input_dir, output_dir);
                    run.missing = matches!(e, Error::InputDirMissing { .. });
                    run.error = Some(e.to_string());
                    directories.push(run);
                }
            }
        }

        Ok(RunSummary {
            dry_run: config.dry_run,
            directories,
        })
    }

    /// Process one input directory into `output_dir`
    pub fn run_directory(&mut self, input_dir: &Path, output_dir: &Path) -> Result<DirectoryRun> {
        if !input_dir.is_dir() {
            return Err(Error::InputDirMissing {
                path: input_dir.to_path_buf(),
            });
        }

        let files = self.collect_files(input_dir)?;
        info!(?input_dir, count = files.len(), "Found media files");

        let mut run = DirectoryRun::new(input_dir, output_dir.to_path_buf());
        run.stats.total_files = files.len();
        if files.is_empty() {
            return Ok(run);
        }

        // Memoized for the rest of this directory once set
        let mut batch: Option<NaiveDateTime> = None;
        if self.config.mode == ProcessingMode::Batch {
            let dt = self.resolver.batch_datetime(input_dir)?;
            info!(batch = %dt, "Batch datetime for directory");
            batch = Some(dt);
        }

        let total = files.len();
        for (i, (path, kind)) in files.iter().enumerate() {
            let result = match self.decide(path, *kind, i + 1, total, &mut batch)? {
                Some((timestamp, source)) => self.process_file(path, *kind, timestamp, source, output_dir),
                None => {
                    info!(?path, "Skipped");
                    FileResult::new(path, ProcessingStatus::Skipped)
                }
            };
            run.push(result);
        }

        Ok(run)
    }

    /// Eligible files directly inside `input_dir`, sorted by name
    fn collect_files(&self, input_dir: &Path) -> Result<Vec<(PathBuf, MediaKind)>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(input_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type().is_file()
                && let Some(kind) = self.config.eligible_kind(path)
            {
                files.push((path.to_path_buf(), kind));
            } else {
                debug!(?path, "Not an eligible media file");
            }
        }
        Ok(files)
    }

    /// Datetime for one file, or `None` to skip it
    fn decide(
        &mut self,
        path: &Path,
        kind: MediaKind,
        index: usize,
        total: usize,
        batch: &mut Option<NaiveDateTime>,
    ) -> Result<Option<(NaiveDateTime, TimeSource)>> {
        if let Some(dt) = *batch {
            return Ok(Some((dt, TimeSource::Batch)));
        }

        let filename = path.file_name().unwrap_or_default().to_string_lossy();
        let detected = time::extract(&filename, kind);

        if self.config.mode == ProcessingMode::Auto
            && let Some(found) = &detected
        {
            return Ok(Some((found.timestamp, TimeSource::Filename(found.pattern))));
        }

        let suggestions = time::suggest(&filename);
        let request = DecisionRequest {
            filename: &filename,
            index,
            total,
            detected: detected.as_ref(),
            suggestions: &suggestions,
            allow_batch: detected.is_none(),
        };
        let decision = self.resolver.resolve(&request)?;
        debug!(?path, ?decision, "Operator decision");

        Ok(match decision.resolve(&request) {
            Resolution::Apply { timestamp, source } => Some((timestamp, source)),
            Resolution::Batch(choice) if choice.apply_to_remaining => {
                info!(batch = %choice.timestamp, "Using operator datetime for the remaining files");
                *batch = Some(choice.timestamp);
                Some((choice.timestamp, TimeSource::Batch))
            }
            Resolution::Batch(choice) => Some((choice.timestamp, TimeSource::Manual)),
            Resolution::Skip => None,
        })
    }

    fn process_file(
        &self,
        path: &Path,
        kind: MediaKind,
        timestamp: NaiveDateTime,
        source: TimeSource,
        output_dir: &Path,
    ) -> FileResult {
        let writer = self.toolbox.writer(kind);
        let mut result = FileResult::new(path, ProcessingStatus::Processed);
        result.timestamp = Some(timestamp);
        result.time_source = Some(source);
        result.writer = Some(writer.name());

        if self.config.dry_run {
            result.status = ProcessingStatus::DryRun;
            result.destination = path.file_name().map(|name| output_dir.join(name));
            info!(
                ?path,
                datetime = %timestamp.format(DISPLAY_FORMAT),
                writer = writer.name(),
                "[DRY RUN] Would retimestamp"
            );
            return result;
        }

        let job = WriteJob {
            path,
            timestamp,
            kind,
            output_dir,
        };
        let placed = writer.apply(&job).and_then(|outcome| match outcome {
            WriteOutcome::Produced(dest) => Ok(dest),
            WriteOutcome::InPlace => copy_into(path, output_dir),
        });

        match placed {
            Ok(dest) => {
                info!(
                    ?path,
                    ?dest,
                    datetime = %timestamp.format(DISPLAY_FORMAT),
                    writer = writer.name(),
                    "Retimestamped"
                );
                result.destination = Some(dest);
            }
            Err(e) => {
                warn!(?path, writer = writer.name(), error = %e, "Failed to retimestamp");
                result.status = ProcessingStatus::Failed;
                result.error = Some(e.to_string());
            }
        }
        result
    }
}

/// Copy `source` into `output_dir`, carrying over its file times
fn copy_into(source: &Path, output_dir: &Path) -> Result<PathBuf> {
    let name = source.file_name().ok_or_else(|| Error::Timestamp {
        path: source.to_path_buf(),
        message: "path has no file name".into(),
    })?;
    fs::create_dir_all(output_dir)?;
    let dest = output_dir.join(name);

    // Creating dest would truncate the source before it is read
    if same_location(source, &dest) {
        return Err(Error::SameFile {
            path: source.to_path_buf(),
        });
    }

    copy_file(source, &dest)?;

    let metadata = fs::metadata(source)?;
    let mtime = FileTime::from_last_modification_time(&metadata);
    let atime = FileTime::from_last_access_time(&metadata);
    filetime::set_file_times(&dest, atime, mtime).map_err(|e| Error::Timestamp {
        path: dest.clone(),
        message: e.to_string(),
    })?;

    Ok(dest)
}

/// Copy file with buffered I/O for efficiency
fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    let src_file = File::open(source)?;
    let dest_file = File::create(dest)?;

    let mut reader = BufReader::with_capacity(256 * 1024, src_file);
    let mut writer = BufWriter::with_capacity(256 * 1024, dest_file);

    let mut buffer = vec![0u8; 256 * 1024];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        writer.write_all(&buffer[..bytes_read])?;
    }

    writer.flush()?;
    Ok(())
}

//! Configuration types for meta-time-changer

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How datetimes are decided for each file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// Extract from the filename, only ask when nothing is detected
    #[default]
    Auto,
    /// Extract from the filename and confirm every file with the operator
    Confirm,
    /// Use one operator-supplied datetime for every file
    Batch,
}

/// Which external tool writes the new datetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// ExifTool if present, FFmpeg remux for videos, file timestamps otherwise
    #[default]
    Auto,
    /// Edit tags in place with ExifTool
    Exiftool,
    /// Remux videos with FFmpeg into the output directory
    Ffmpeg,
    /// Only set file system timestamps
    Basic,
}

/// Kind of media a file holds, decided by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Photo,
}

/// Which media kinds a run picks up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MediaFilter {
    #[default]
    All,
    Video,
    Photo,
}

impl MediaFilter {
    pub fn accepts(&self, kind: MediaKind) -> bool {
        match self {
            MediaFilter::All => true,
            MediaFilter::Video => kind == MediaKind::Video,
            MediaFilter::Photo => kind == MediaKind::Photo,
        }
    }
}

/// Configuration for a retimestamping run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directories whose files are retimestamped (not recursive)
    pub input_dirs: Vec<PathBuf>,

    /// Output directory; defaults to `<input>_updated` next to each input
    pub output_dir: Option<PathBuf>,

    pub mode: ProcessingMode,

    pub tool: ToolChoice,

    pub media: MediaFilter,

    /// Resolve datetimes but don't write or copy anything
    pub dry_run: bool,

    pub verbose: bool,

    /// UI language ("en", "id"); system locale when unset
    pub language: Option<String>,

    /// Explicit ExifTool binary, otherwise looked up on PATH
    pub exiftool_path: Option<PathBuf>,

    /// Explicit FFmpeg binary, otherwise looked up on PATH
    pub ffmpeg_path: Option<PathBuf>,

    /// Timeout for `-ver`/`-version` probes, in seconds
    pub probe_timeout_secs: u64,

    /// Timeout for one ExifTool tag edit, in seconds
    pub tag_timeout_secs: u64,

    /// Timeout for one FFmpeg remux, in seconds
    pub remux_timeout_secs: u64,

    pub image_extensions: Vec<String>,

    pub video_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dirs: vec![],
            output_dir: None,
            mode: ProcessingMode::default(),
            tool: ToolChoice::default(),
            media: MediaFilter::default(),
            dry_run: false,
            verbose: false,
            language: None,
            exiftool_path: None,
            ffmpeg_path: None,
            probe_timeout_secs: 5,
            tag_timeout_secs: 30,
            remux_timeout_secs: 60,
            image_extensions: vec![
                "jpg".into(), "jpeg".into(), "png".into(), "heic".into(),
                "gif".into(), "bmp".into(), "tiff".into(), "webp".into(),
            ],
            video_extensions: vec![
                "mp4".into(), "mov".into(), "avi".into(), "mkv".into(), "m4v".into(),
                "wmv".into(), "flv".into(), "3gp".into(), "webm".into(),
            ],
        }
    }
}

impl Config {
    /// Check if a file extension is a supported image format
    pub fn is_image(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.image_extensions.iter().any(|e| e == &ext_lower)
    }

    /// Check if a file extension is a supported video format
    pub fn is_video(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.video_extensions.iter().any(|e| e == &ext_lower)
    }

    /// Media kind for an extension, if it is one we handle
    pub fn media_kind(&self, ext: &str) -> Option<MediaKind> {
        if self.is_video(ext) {
            Some(MediaKind::Video)
        } else if self.is_image(ext) {
            Some(MediaKind::Photo)
        } else {
            None
        }
    }

    /// Media kind for a path, honoring the configured media filter
    pub fn eligible_kind(&self, path: &Path) -> Option<MediaKind> {
        let ext = path.extension().and_then(|e| e.to_str())?;
        self.media_kind(ext).filter(|kind| self.media.accepts(*kind))
    }

    /// Output directory for one input directory
    pub fn output_dir_for(&self, input_dir: &Path) -> PathBuf {
        if let Some(ref output) = self.output_dir {
            return output.clone();
        }
        default_output_dir(input_dir)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn tag_timeout(&self) -> Duration {
        Duration::from_secs(self.tag_timeout_secs)
    }

    pub fn remux_timeout(&self) -> Duration {
        Duration::from_secs(self.remux_timeout_secs)
    }

    /// Reject settings that can never produce a working run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_dirs.is_empty() {
            return Err(ConfigError::Invalid("no input directories given".into()));
        }
        if self.tag_timeout_secs == 0 || self.remux_timeout_secs == 0 || self.probe_timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be at least one second".into()));
        }
        for input_dir in &self.input_dirs {
            if same_location(&self.output_dir_for(input_dir), input_dir) {
                return Err(ConfigError::Invalid(format!(
                    "output directory must differ from input directory {}",
                    input_dir.display()
                )));
            }
        }
        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Generate a sample configuration file content
    pub fn sample_config() -> String {
        r#"# meta-time-changer configuration file
# This file uses TOML format (https://toml.io)

# Folders whose media files get new timestamps (files directly inside only)
input_dirs = [
    "D:/Camera/2023",
]

# Where processed files are written.
# Leave out to use "<input>_updated" next to every input folder.
# output_dir = "D:/Camera/2023_updated"

# How datetimes are decided: "auto", "confirm" or "batch"
# - auto: read the filename, only ask when no date is found (default)
# - confirm: read the filename and confirm every file
# - batch: one date for every file
mode = "auto"

# Writer: "auto", "exiftool", "ffmpeg" or "basic"
# - auto: ExifTool if installed, FFmpeg remux for videos, else file timestamps
# - basic: only file system timestamps
tool = "auto"

# Which files: "all", "video" or "photo"
media = "all"

# Show what would happen without writing anything
dry_run = false

verbose = false

# UI language, "en" or "id". System locale when left out.
# language = "en"

# Tool locations, looked up on PATH when left out
# exiftool_path = "C:/Tools/exiftool.exe"
# ffmpeg_path = "C:/Tools/ffmpeg.exe"

# Timeouts in seconds
probe_timeout_secs = 5
tag_timeout_secs = 30
remux_timeout_secs = 60

image_extensions = ["jpg", "jpeg", "png", "heic", "gif", "bmp", "tiff", "webp"]
video_extensions = ["mp4", "mov", "avi", "mkv", "m4v", "wmv", "flv", "3gp", "webm"]
"#
        .to_string()
    }
}

/// `<parent>/<name>_updated` for an input folder
pub fn default_output_dir(input_dir: &Path) -> PathBuf {
    let name = input_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let parent = input_dir.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!("{}_updated", name))
}

/// Whether two paths name the same place once `..` and symlinks are resolved
///
/// Paths that don't exist yet are compared as written.
pub fn same_location(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read configuration file
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse configuration file
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// Settings are unusable
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError { path, source } => {
                write!(f, "Failed to read config file '{}': {}", path.display(), source)
            }
            ConfigError::ParseError { path, source } => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), source)
            }
            ConfigError::Invalid(message) => write!(f, "Invalid configuration: {}", message),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_by_extension() {
        let config = Config::default();
        assert_eq!(config.media_kind("MP4"), Some(MediaKind::Video));
        assert_eq!(config.media_kind("webm"), Some(MediaKind::Video));
        assert_eq!(config.media_kind("heic"), Some(MediaKind::Photo));
        assert_eq!(config.media_kind("JPEG"), Some(MediaKind::Photo));
        assert_eq!(config.media_kind("txt"), None);
    }

    #[test]
    fn test_media_filter() {
        let mut config = Config::default();
        config.media = MediaFilter::Photo;
        assert_eq!(config.eligible_kind(Path::new("a/IMG_1.jpg")), Some(MediaKind::Photo));
        assert_eq!(config.eligible_kind(Path::new("a/VID_1.mp4")), None);
        assert_eq!(config.eligible_kind(Path::new("a/noext")), None);
    }

    #[test]
    fn test_default_output_dir() {
        assert_eq!(
            default_output_dir(Path::new("/media/camera")),
            PathBuf::from("/media/camera_updated")
        );

        let mut config = Config::default();
        config.output_dir = Some(PathBuf::from("/out"));
        assert_eq!(config.output_dir_for(Path::new("/media/camera")), PathBuf::from("/out"));
    }

    #[test]
    fn test_sample_config_parses() {
        let config: Config = toml::from_str(&Config::sample_config()).unwrap();
        assert_eq!(config.mode, ProcessingMode::Auto);
        assert_eq!(config.tool, ToolChoice::Auto);
        assert_eq!(config.tag_timeout_secs, 30);
        assert_eq!(config.video_extensions.len(), 9);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("input_dirs = [\"x\"]\nmode = \"batch\"\n").unwrap();
        assert_eq!(config.mode, ProcessingMode::Batch);
        assert_eq!(config.remux_timeout_secs, 60);
        assert!(config.is_image("png"));
    }

    #[test]
    fn test_validate() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.input_dirs = vec![PathBuf::from("/in")];
        assert!(config.validate().is_ok());

        config.output_dir = Some(PathBuf::from("/in"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_resolves_dot_dot() {
        let temp = tempfile::TempDir::new().unwrap();
        let pics = temp.path().join("pics");
        fs::create_dir(&pics).unwrap();

        let config = Config {
            input_dirs: vec![pics.join("..").join("pics")],
            output_dir: Some(pics.clone()),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = Config {
            input_dirs: vec![pics.join("..").join("pics")],
            output_dir: Some(temp.path().join("out")),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_same_location() {
        let temp = tempfile::TempDir::new().unwrap();
        let a = temp.path().join("a");
        fs::create_dir(&a).unwrap();

        assert!(same_location(&a, &temp.path().join(".").join("a")));
        assert!(!same_location(&a, temp.path()));
        assert!(same_location(Path::new("missing/x"), Path::new("missing/x")));
        assert!(!same_location(&a, &temp.path().join("missing")));
    }
}

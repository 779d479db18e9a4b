//! Meta Time Changer - retimestamp media from the dates in their filenames
//!
//! This library provides:
//! - A pattern library of camera, phone and app naming conventions
//! - Calendar validation and tiered filename extraction
//! - Loose date suggestions and operator prompts when extraction fails
//! - Metadata writers backed by ExifTool, FFmpeg or file timestamps
//! - A sequential processor that copies results to an output folder

// Initialize i18n with locale files
rust_i18n::i18n!("locales", fallback = "en");

pub mod cli;
pub mod config;
pub mod console;
pub mod display;
pub mod error;
pub mod i18n;
pub mod process;
pub mod resolve;
pub mod time;
pub mod tools;

pub use cli::Cli;
pub use config::{Config, ConfigError, MediaFilter, MediaKind, ProcessingMode, ToolChoice};
pub use console::ConsoleResolver;
pub use error::{Error, Result};
pub use i18n::init_locale;
pub use process::{Processor, RunSummary};
pub use resolve::{NonInteractive, Resolver};
pub use tools::{Capabilities, Toolbox};

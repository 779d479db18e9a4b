//! Meta Time Changer - retimestamp photos and videos from their filenames
//!
//! A CLI tool that reads the capture date encoded in media filenames and
//! writes it back into the files' metadata and timestamps.

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use meta_time_changer::display::{
    display_capabilities, display_filename_test, display_formats, display_interrupted, display_report_written,
    display_summary, print_error,
};
use meta_time_changer::{
    Capabilities, Cli, Config, ConsoleResolver, Error, NonInteractive, ProcessingMode, Processor, Resolver,
    RunSummary, Toolbox, init_locale,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*};

/// Exit status for a bad configuration
const EXIT_CONFIG: u8 = 2;
/// Exit status when nothing could be processed
const EXIT_NO_INPUT: u8 = 1;
/// Exit status after an operator interrupt
const EXIT_INTERRUPTED: u8 = 130;

fn main() -> Result<ExitCode> {
    // No arguments at all starts the guided setup
    let interactive = std::env::args_os().len() == 1;
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", Config::sample_config());
        return Ok(ExitCode::SUCCESS);
    }

    let exe_dir = get_executable_dir()?;
    let config = match load_config(&cli, &exe_dir) {
        Ok(config) => config,
        Err(e) => {
            init_locale(cli.lang.as_deref());
            print_error(&format!("{e:#}"));
            return Ok(ExitCode::from(EXIT_CONFIG));
        }
    };
    init_locale(config.language.as_deref());

    let log_path = get_log_path(&exe_dir, &cli, interactive);
    let _guard = setup_logging(&cli, &log_path)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Meta Time Changer starting");
    info!(log_file = %log_path.display(), "Log file location");

    if cli.formats {
        display_formats();
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(ref filenames) = cli.test {
        for filename in filenames {
            display_filename_test(filename, &config);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let caps = Capabilities::probe(&config);
    if cli.check_tools {
        display_capabilities(&caps, &config);
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = if cli.no_prompt {
        let mut resolver = NonInteractive::new(cli.batch_date);
        run_cli_mode(&cli, config, &caps, &mut resolver, &log_path)
    } else {
        let mut console = ConsoleResolver::stdio().with_batch(cli.batch_date);
        let config = if interactive {
            match console.settings_wizard(config) {
                Ok(config) => config,
                Err(Error::Interrupted) => {
                    display_interrupted();
                    return Ok(ExitCode::from(EXIT_INTERRUPTED));
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            config
        };
        run_cli_mode(&cli, config, &caps, &mut console, &log_path)
    };

    Ok(ExitCode::from(outcome?))
}

/// Validate, process every input directory and report
fn run_cli_mode<R: Resolver>(
    cli: &Cli,
    config: Config,
    caps: &Capabilities,
    resolver: &mut R,
    log_path: &Path,
) -> Result<u8> {
    if config.verbose {
        info!(?config, "Configuration loaded");
    }

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        print_error(&e.to_string());
        return Ok(EXIT_CONFIG);
    }
    if cli.no_prompt && config.mode == ProcessingMode::Batch && cli.batch_date.is_none() {
        error!("Batch mode without prompts needs --batch-date");
        print_error("--no-prompt with batch mode needs --batch-date");
        return Ok(EXIT_CONFIG);
    }

    let toolbox = Toolbox::new(&config, caps);
    let summary = match Processor::new(&config, &toolbox, resolver).run() {
        Ok(summary) => summary,
        Err(Error::Interrupted) => {
            info!("Interrupted by operator");
            display_interrupted();
            return Ok(EXIT_INTERRUPTED);
        }
        Err(e) => {
            error!(error = %e, "Processing failed");
            return Err(e.into());
        }
    };

    info!(stats = %summary.totals().summary(), "Processing complete");
    display_summary(&summary, config.verbose, Some(log_path));

    if let Some(ref report) = cli.report {
        write_report(&summary, report)?;
        display_report_written(report);
    }

    Ok(if summary.all_missing() { EXIT_NO_INPUT } else { 0 })
}

fn write_report(summary: &RunSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, summary.to_json()?)?;
    info!(report = %path.display(), "Report written");
    Ok(())
}

/// Get the directory where the executable is located
fn get_executable_dir() -> Result<PathBuf> {
    let exe_path = std::env::current_exe()?;
    Ok(exe_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".")))
}

/// Determine the log file path based on config file or timestamp
fn get_log_path(exe_dir: &Path, cli: &Cli, interactive: bool) -> PathBuf {
    let log_dir = exe_dir.join("Log");
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");

    if let Some(config_name) = cli.config_name() {
        let config_log_dir = log_dir.join(&config_name);
        config_log_dir.join(format!("{}_{}.log", config_name, timestamp))
    } else if interactive {
        log_dir.join(format!("Interactive_{}.log", timestamp))
    } else {
        log_dir.join(format!("CLIRun_{}.log", timestamp))
    }
}

/// Resolve config path - supports shorthand syntax
fn resolve_config_path(exe_dir: &Path, config_path: &Path) -> PathBuf {
    if config_path.exists() {
        return config_path.to_path_buf();
    }

    let with_extension = if config_path.extension().is_none() {
        config_path.with_extension("toml")
    } else {
        config_path.to_path_buf()
    };

    if with_extension.exists() {
        return with_extension;
    }

    let config_dir = exe_dir.join("Config");
    let filename = config_path.file_name().unwrap_or(config_path.as_os_str());

    let mut in_config_dir = config_dir.join(filename);
    if in_config_dir.extension().is_none() {
        in_config_dir = in_config_dir.with_extension("toml");
    }

    if in_config_dir.exists() {
        return in_config_dir;
    }

    config_path.to_path_buf()
}

/// Load configuration from file or CLI arguments
fn load_config(cli: &Cli, exe_dir: &Path) -> Result<Config> {
    let config = if let Some(ref config_path) = cli.config {
        let resolved_path = resolve_config_path(exe_dir, config_path);
        let file_config = Config::load_from_file(&resolved_path)?;
        cli.merge_with_config(file_config)
    } else {
        cli.to_config()
    };
    Ok(config)
}

/// Setup logging: file at INFO (DEBUG with --verbose), console warnings only
fn setup_logging(cli: &Cli, log_path: &Path) -> Result<WorkerGuard> {
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let console_level = if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(log_path)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_filter(console_level));

    if cli.json_log {
        subscriber
            .with(fmt::layer().json().with_ansi(false).with_writer(non_blocking))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .init();
    }

    Ok(guard)
}

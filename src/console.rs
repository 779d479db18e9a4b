//! Console prompts: per-file decisions, batch dates and the settings wizard
//!
//! Generic over the input and output streams so tests can drive it with
//! scripted input.

use crate::config::{Config, MediaFilter, ProcessingMode, ToolChoice, default_output_dir};
use crate::error::{Error, Result};
use crate::resolve::{Decision, DecisionRequest, Resolver};
use crate::time::{DISPLAY_FORMAT, ManualInputError, parse_manual_datetime};
use chrono::NaiveDateTime;
use crossterm::style::{Color, Stylize, style};
use rust_i18n::t;
use std::io::{self, BufRead, StdinLock, Stdout, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One line of the per-file menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Accept,
    Suggestion(usize),
    Manual,
    ApplyToRemaining,
    Skip,
}

fn menu_options(request: &DecisionRequest<'_>) -> Vec<MenuChoice> {
    let mut options = Vec::with_capacity(request.suggestions.len() + 4);
    if request.detected.is_some() {
        options.push(MenuChoice::Accept);
    }
    options.extend((0..request.suggestions.len()).map(MenuChoice::Suggestion));
    options.push(MenuChoice::Manual);
    if request.allow_batch {
        options.push(MenuChoice::ApplyToRemaining);
    }
    options.push(MenuChoice::Skip);
    options
}

pub struct ConsoleResolver<R, W> {
    input: R,
    output: W,
    /// Answer for batch mode given up front, so it is never asked
    preset_batch: Option<NaiveDateTime>,
}

impl ConsoleResolver<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleResolver<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            preset_batch: None,
        }
    }

    pub fn with_batch(mut self, batch: Option<NaiveDateTime>) -> Self {
        self.preset_batch = batch;
        self
    }

    /// Give back the streams, mostly so tests can inspect the output
    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Print `prompt` and read one trimmed line; end of input interrupts
    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{} ", style(prompt).with(Color::Cyan))?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Err(Error::Interrupted);
        }
        Ok(line.trim().to_string())
    }

    fn notice(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "  {} {}", style("!").with(Color::Yellow).bold(), message)?;
        Ok(())
    }

    /// Ask for a 1-based menu number until a valid one is given; empty
    /// input picks `default` when there is one
    fn choose(&mut self, labels: &[String], default: Option<usize>) -> Result<usize> {
        for (i, label) in labels.iter().enumerate() {
            let marker = if default == Some(i) { "*" } else { " " };
            writeln!(self.output, "  {}{} {}", style(i + 1).with(Color::Green).bold(), marker, label)?;
        }
        loop {
            let answer = self.ask(&t!("console_choose", max = labels.len()))?;
            if answer.is_empty()
                && let Some(default) = default
            {
                return Ok(default);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=labels.len()).contains(&n) => return Ok(n - 1),
                _ => self.notice(&t!("console_invalid_choice", max = labels.len()))?,
            }
        }
    }

    /// Read a datetime; `None` when the operator leaves it empty
    fn ask_datetime(&mut self, prompt: &str) -> Result<Option<NaiveDateTime>> {
        loop {
            let answer = self.ask(prompt)?;
            match parse_manual_datetime(&answer) {
                Ok(dt) => return Ok(Some(dt)),
                Err(ManualInputError::Empty) => return Ok(None),
                Err(e) => {
                    debug!(input = %answer, error = %e, "Rejected manual date");
                    self.notice(&t!("console_manual_invalid", error = e.to_string()))?;
                }
            }
        }
    }

    fn show_request(&mut self, request: &DecisionRequest<'_>) -> Result<()> {
        writeln!(self.output)?;
        writeln!(
            self.output,
            "{} {}",
            style(format!("[{}/{}]", request.index, request.total)).with(Color::DarkGrey),
            style(request.filename).bold()
        )?;
        match request.detected {
            Some(found) => {
                let when = found.timestamp.format(DISPLAY_FORMAT).to_string();
                let line = if found.carries_time {
                    t!("console_detected", datetime = when, pattern = found.pattern)
                } else {
                    t!("console_detected_date_only", datetime = when, pattern = found.pattern)
                };
                writeln!(self.output, "  {}", style(line).with(Color::Green))?;
            }
            None => {
                writeln!(self.output, "  {}", style(t!("console_nothing_detected")).with(Color::Yellow))?;
            }
        }
        Ok(())
    }

    fn label(&self, choice: MenuChoice, request: &DecisionRequest<'_>) -> String {
        match choice {
            MenuChoice::Accept => t!("console_option_accept").to_string(),
            MenuChoice::Suggestion(i) => match request.suggestions.get(i) {
                Some(s) => t!(
                    "console_option_suggestion",
                    date = s.date.format("%d/%m/%Y").to_string(),
                    reading = s.reading
                )
                .to_string(),
                None => String::new(),
            },
            MenuChoice::Manual => t!("console_option_manual").to_string(),
            MenuChoice::ApplyToRemaining => t!("console_option_batch").to_string(),
            MenuChoice::Skip => t!("console_option_skip").to_string(),
        }
    }

    /// Collect run settings when the program is started without arguments
    pub fn settings_wizard(&mut self, mut config: Config) -> Result<Config> {
        writeln!(self.output, "\n{}", style(t!("wizard_title")).with(Color::Cyan).bold())?;
        writeln!(self.output, "{}", "─".repeat(60))?;

        let input = loop {
            let answer = self.ask(&t!("wizard_input_dir"))?;
            let path = PathBuf::from(answer.trim_matches('"'));
            if answer.is_empty() {
                continue;
            }
            if path.is_dir() {
                break path;
            }
            self.notice(&t!("wizard_input_missing", path = path.display().to_string()))?;
        };

        let default_output = default_output_dir(&input);
        let answer = self.ask(&t!("wizard_output_dir", default = default_output.display().to_string()))?;
        config.output_dir = if answer.is_empty() {
            None
        } else {
            Some(PathBuf::from(answer.trim_matches('"')))
        };
        config.input_dirs = vec![input];

        writeln!(self.output, "\n{}", t!("wizard_media"))?;
        config.media = self.pick_from(
            &[
                (MediaFilter::All, t!("wizard_media_all").to_string()),
                (MediaFilter::Video, t!("wizard_media_video").to_string()),
                (MediaFilter::Photo, t!("wizard_media_photo").to_string()),
            ],
            config.media,
        )?;

        writeln!(self.output, "\n{}", t!("wizard_mode"))?;
        config.mode = self.pick_from(
            &[
                (ProcessingMode::Auto, t!("wizard_mode_auto").to_string()),
                (ProcessingMode::Confirm, t!("wizard_mode_confirm").to_string()),
                (ProcessingMode::Batch, t!("wizard_mode_batch").to_string()),
            ],
            config.mode,
        )?;

        writeln!(self.output, "\n{}", t!("wizard_tool"))?;
        config.tool = self.pick_from(
            &[
                (ToolChoice::Auto, t!("wizard_tool_auto").to_string()),
                (ToolChoice::Exiftool, t!("wizard_tool_exiftool").to_string()),
                (ToolChoice::Ffmpeg, t!("wizard_tool_ffmpeg").to_string()),
                (ToolChoice::Basic, t!("wizard_tool_basic").to_string()),
            ],
            config.tool,
        )?;

        Ok(config)
    }

    fn pick_from<T: Copy + PartialEq>(&mut self, options: &[(T, String)], current: T) -> Result<T> {
        let labels: Vec<String> = options.iter().map(|(_, label)| label.clone()).collect();
        let default = options.iter().position(|(value, _)| *value == current);
        let index = self.choose(&labels, default)?;
        Ok(options[index].0)
    }
}

impl<R: BufRead, W: Write> Resolver for ConsoleResolver<R, W> {
    fn resolve(&mut self, request: &DecisionRequest<'_>) -> Result<Decision> {
        self.show_request(request)?;
        let options = menu_options(request);
        let labels: Vec<String> = options.iter().map(|c| self.label(*c, request)).collect();

        loop {
            let default = options.iter().position(|c| *c == MenuChoice::Accept);
            let choice = options[self.choose(&labels, default)?];
            match choice {
                MenuChoice::Accept => return Ok(Decision::Accept),
                MenuChoice::Suggestion(i) => return Ok(Decision::PickSuggestion(i)),
                MenuChoice::Skip => return Ok(Decision::Skip),
                MenuChoice::Manual => {
                    if let Some(dt) = self.ask_datetime(&t!("console_manual_prompt"))? {
                        return Ok(Decision::Manual(dt));
                    }
                }
                MenuChoice::ApplyToRemaining => {
                    if let Some(dt) = self.ask_datetime(&t!("console_manual_prompt"))? {
                        return Ok(Decision::ApplyToRemaining(dt));
                    }
                }
            }
        }
    }

    fn batch_datetime(&mut self, input_dir: &Path) -> Result<NaiveDateTime> {
        if let Some(dt) = self.preset_batch {
            return Ok(dt);
        }
        let prompt = t!("console_batch_prompt", dir = input_dir.display().to_string());
        loop {
            if let Some(dt) = self.ask_datetime(&prompt)? {
                return Ok(dt);
            }
        }
    }
}

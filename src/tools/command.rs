//! Blocking child processes with a deadline

use crate::error::{Error, Result};
use std::io::{ErrorKind, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured result of a finished child
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Last non-empty stderr line, for error messages
    pub fn error_line(&self) -> String {
        self.stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .map(|l| l.trim().to_string())
            .unwrap_or_else(|| format!("exit status {}", self.status))
    }
}

/// Run `command` to completion, killing it once `timeout` passes
///
/// Both output pipes are drained on helper threads so a child that writes
/// a lot can't stall on a full pipe while we wait.
pub fn run_with_timeout(tool: &'static str, mut command: Command, timeout: Duration) -> Result<CommandOutput> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    trace!(tool, ?command, "Spawning");
    let mut child = command.spawn().map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::ToolUnavailable { tool },
        _ => Error::Io(e),
    })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match wait_until(&mut child, timeout)? {
        Some(status) => status,
        None => {
            warn!(tool, timeout_secs = timeout.as_secs_f32(), "Killing child after timeout");
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::ToolTimeout { tool, timeout });
        }
    };

    let output = CommandOutput {
        status,
        stdout: join(stdout),
        stderr: join(stderr),
    };
    debug!(tool, status = %output.status, "Child finished");
    Ok(output)
}

fn wait_until(child: &mut Child, timeout: Duration) -> Result<Option<ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn join(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[test]
    fn test_captures_output() {
        let out = run_with_timeout("sh", sh("echo hello; echo oops >&2"), Duration::from_secs(5)).unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.error_line(), "oops");
    }

    #[test]
    fn test_nonzero_exit_is_not_an_error() {
        let out = run_with_timeout("sh", sh("exit 3"), Duration::from_secs(5)).unwrap();
        assert!(!out.success());
        assert!(out.error_line().contains('3'));
    }

    #[test]
    fn test_large_output_does_not_block() {
        let out = run_with_timeout("sh", sh("head -c 1000000 /dev/zero | tr '\\0' 'x' >&2"), Duration::from_secs(10))
            .unwrap();
        assert_eq!(out.stderr.len(), 1_000_000);
    }

    #[test]
    fn test_timeout_kills_child() {
        let start = Instant::now();
        let err = run_with_timeout("sh", sh("sleep 10"), Duration::from_millis(200)).unwrap_err();
        assert!(matches!(err, Error::ToolTimeout { tool: "sh", .. }));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_missing_program() {
        let err = run_with_timeout("nope", Command::new("definitely-not-a-real-tool-xyz"), Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, Error::ToolUnavailable { tool: "nope" }));
    }
}

//! External tool invocation.
//!
//! [`ToolCommand`] builds and executes a single ffmpeg/ffprobe run with
//! captured output; the [`CommandRunner`] trait is the seam the orchestrator
//! talks through, so tests can script tool behavior without the real
//! binaries. On failure the captured stderr is logged and embedded in the
//! returned error.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::error;

use crate::error::{Error, Result};

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use vodforge::transcode::ToolCommand;
///
/// # async fn example() -> vodforge::error::Result<()> {
/// let output = ToolCommand::new("ffprobe")
///     .arg("-v").arg("error")
///     .arg("-show_entries").arg("format=duration")
///     .arg("/path/to/video.mkv")
///     .execute()
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ToolCommand {
    /// Create a new command for the given program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, s: impl Into<String>) -> Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set a maximum execution time. Unset by default: a feature-length
    /// transcode may legitimately run for hours.
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = Some(d);
        self
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tool`] if the process cannot be spawned, times out,
    /// or exits non-zero (the message includes trimmed stderr).
    pub async fn execute(&self) -> Result<ToolOutput> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdout(std::process::Stdio::piped());
        cmd.stderr(std::process::Stdio::piped());

        let child = cmd.spawn().map_err(|e| Error::Tool {
            tool: self.program.clone(),
            message: format!("failed to spawn: {e}"),
        })?;

        let wait = child.wait_with_output();
        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, wait).await {
                Ok(result) => result,
                Err(_elapsed) => {
                    return Err(Error::Tool {
                        tool: self.program.clone(),
                        message: format!("timed out after {limit:?}"),
                    });
                }
            },
            None => wait.await,
        }
        .map_err(|e| Error::Tool {
            tool: self.program.clone(),
            message: format!("I/O error waiting for process: {e}"),
        })?;

        let tool_output = ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !output.status.success() {
            error!(
                tool = %self.program,
                status = %output.status,
                stderr = %tool_output.stderr.trim(),
                "tool execution failed"
            );
            return Err(Error::Tool {
                tool: self.program.clone(),
                message: format!(
                    "exited with status {}: {}",
                    output.status,
                    tool_output.stderr.trim()
                ),
            });
        }

        Ok(tool_output)
    }
}

/// Seam for executing external tools.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, returning captured output on success.
    async fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput>;
}

/// Production runner: spawns the real processes.
#[derive(Debug, Default, Clone)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput> {
        ToolCommand::new(program).args(args.to_vec()).execute().await
    }
}

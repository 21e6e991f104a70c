//! External command execution.
//!
//! Every external tool (git, agvtool, xcodebuild) is invoked through the
//! [`CommandRunner`] trait so tests can substitute a recording fake. The real
//! [`ShellRunner`] runs argv against a fixed working directory, captures
//! stdout, caps captured output, and kills commands that exceed the timeout.

use crate::error::{CommandError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Executes external commands for the release pipeline
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, returning captured stdout.
    ///
    /// A non-zero exit is an error; there are no retries.
    async fn run(&self, program: &str, args: &[&str]) -> Result<String>;
}

/// Real command runner spawning child processes
#[derive(Debug, Clone)]
pub struct ShellRunner {
    /// Working directory for every command
    working_dir: PathBuf,
    /// Per-command timeout; the child is killed on expiry
    timeout: Duration,
    /// Cap on captured stdout/stderr
    max_output_bytes: usize,
}

impl ShellRunner {
    /// Create a runner bound to a working directory
    pub fn new(working_dir: impl Into<PathBuf>, timeout: Duration, max_output_bytes: usize) -> Self {
        Self {
            working_dir: working_dir.into(),
            timeout,
            max_output_bytes,
        }
    }

    /// Working directory commands execute in
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let rendered = render_command(program, args);
        log::info!("Running: {} (in {})", rendered, self.working_dir.display());

        let child = Command::new(program)
            .args(args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| CommandError::Spawn {
                command: rendered.clone(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| CommandError::Spawn {
                command: rendered.clone(),
                source,
            })?,
            // Dropping the in-flight wait kills the child (kill_on_drop)
            Err(_) => {
                return Err(CommandError::TimedOut {
                    command: rendered,
                    timeout_secs: self.timeout.as_secs(),
                }
                .into());
            }
        };

        let stdout = capped_lossy(&output.stdout, self.max_output_bytes);
        if !output.status.success() {
            let stderr = capped_lossy(&output.stderr, self.max_output_bytes);
            return Err(CommandError::Failed {
                command: rendered,
                status: output.status.code(),
                stderr,
            }
            .into());
        }

        Ok(stdout)
    }
}

/// Render an argv for logs and error messages
pub fn render_command(program: &str, args: &[&str]) -> String {
    let mut rendered = String::from(program);
    for arg in args {
        rendered.push(' ');
        if arg.contains(char::is_whitespace) {
            rendered.push('"');
            rendered.push_str(arg);
            rendered.push('"');
        } else {
            rendered.push_str(arg);
        }
    }
    rendered
}

/// Decode captured output, truncating to the cap on a char boundary
fn capped_lossy(bytes: &[u8], cap: usize) -> String {
    let mut text = String::from_utf8_lossy(bytes).into_owned();
    if text.len() > cap {
        let mut end = cap;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
        text.push_str("\n…[output truncated]");
    }
    text
}

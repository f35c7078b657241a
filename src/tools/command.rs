//! Blocking execution of external commands.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{ReviewError, Result};

/// Shell used for command strings. Check scripts rely on `source`.
pub const SHELL: &str = "bash";

/// Captured result of an external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    pub stdout: String,

    pub stderr: String,

    pub duration: Duration,

    /// Whether the command exited with code 0.
    pub success: bool,
}

impl CommandOutput {
    /// Stdout followed by stderr.
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&self.stderr);
        }
        out
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with the process environment).
    pub env: HashMap<String, String>,
}

impl CommandOptions {
    pub fn in_dir(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
            ..Default::default()
        }
    }
}

/// Run a command string through [`SHELL`].
pub fn execute(command: &str, options: &CommandOptions) -> Result<CommandOutput> {
    run(SHELL, &["-c".to_string(), command.to_string()], command, options)
}

/// Run a program with explicit arguments, bypassing the shell.
pub fn execute_program(
    program: &str,
    args: &[String],
    options: &CommandOptions,
) -> Result<CommandOutput> {
    let command_line = std::iter::once(program.to_string())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ");
    run(program, args, &command_line, options)
}

/// Run a command string in `dir` with default options.
pub fn execute_in(command: &str, dir: &Path) -> Result<CommandOutput> {
    execute(command, &CommandOptions::in_dir(dir))
}

fn run(
    program: &str,
    args: &[String],
    command_line: &str,
    options: &CommandOptions,
) -> Result<CommandOutput> {
    let start = Instant::now();
    debug!("Running: {}", command_line);

    let mut cmd = Command::new(program);
    cmd.args(args);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let output = cmd.output().map_err(|e| ReviewError::ToolUnavailable {
        command: command_line.to_string(),
        message: e.to_string(),
    })?;

    let result = CommandOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        duration: start.elapsed(),
        success: output.status.success(),
    };
    debug!(
        "Command exited with {:?} after {:?}",
        result.exit_code, result.duration
    );
    Ok(result)
}

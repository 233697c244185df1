// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Blocking invocation of OS credential tools

use crate::storage::BackendError;
use std::io::{self, Write};
use std::process::{Command, Stdio};

/// Captured result of a tool invocation
#[derive(Debug)]
pub(crate) struct ToolOutput {
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).trim().to_string()
    }

    /// Failure with the tool's own diagnostics
    pub fn failure(&self, tool: &'static str) -> BackendError {
        let detail = self.stderr.trim();
        let message = match (self.code, detail.is_empty()) {
            (Some(code), true) => format!("exit code {}", code),
            (Some(code), false) => format!("exit code {}: {}", code, detail),
            (None, _) => "terminated by signal".to_string(),
        };
        BackendError::Command { tool, message }
    }
}

/// Run `tool` with `args`, feeding `stdin` when given, and wait for it.
pub(crate) fn run(
    tool: &'static str,
    args: &[String],
    stdin: Option<&[u8]>,
) -> Result<ToolOutput, BackendError> {
    tracing::trace!(tool, arg_count = args.len(), "running");

    let mut child = Command::new(tool)
        .args(args)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| spawn_error(tool, source))?;

    if let Some(input) = stdin {
        if let Some(mut pipe) = child.stdin.take() {
            if let Err(e) = pipe.write_all(input) {
                drop(pipe);
                // Reap before reporting
                let _ = child.kill();
                let _ = child.wait();
                return Err(BackendError::Command {
                    tool,
                    message: format!("writing stdin: {}", e),
                });
            }
        }
    }

    let output = child.wait_with_output().map_err(|e| BackendError::Command {
        tool,
        message: e.to_string(),
    })?;

    Ok(ToolOutput {
        code: output.status.code(),
        stdout: output.stdout,
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

fn spawn_error(tool: &'static str, source: io::Error) -> BackendError {
    if source.kind() == io::ErrorKind::NotFound {
        BackendError::Unavailable { tool, source }
    } else {
        BackendError::Command {
            tool,
            message: source.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;

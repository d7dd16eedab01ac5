//! # Process Runner
//!
//! Every pipeline stage talks to the outside world (git, the vault tool) through
//! the [`Runner`] trait. A run never fails as a Rust error: spawn failures and
//! non-zero exits both come back as `success == false`, with whatever output
//! was captured kept for diagnostics.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Captured result of one external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// stdout followed by stderr
    pub output: Vec<u8>,
    pub success: bool,
}

impl CommandOutput {
    pub fn success(output: impl Into<Vec<u8>>) -> Self {
        Self {
            output: output.into(),
            success: true,
        }
    }

    pub fn failure(output: impl Into<Vec<u8>>) -> Self {
        Self {
            output: output.into(),
            success: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.output.iter().all(u8::is_ascii_whitespace)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.output).trim_end().to_string()
    }
}

/// Runs `program args... targets...` and captures its output
#[async_trait]
pub trait Runner: Send + Sync {
    async fn run(&self, program: &str, args: &[String], targets: &[PathBuf]) -> CommandOutput;
}

/// [`Runner`] backed by real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl Runner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String], targets: &[PathBuf]) -> CommandOutput {
        debug!(program, ?args, ?targets, "running command");

        let result = Command::new(program)
            .args(args)
            .args(targets)
            .stdin(Stdio::null())
            .output()
            .await;

        match result {
            Ok(out) => {
                let mut output = out.stdout;
                output.extend_from_slice(&out.stderr);
                let captured = CommandOutput {
                    output,
                    success: out.status.success(),
                };
                debug!(program, status = %out.status, output = %captured.text(), "command finished");
                captured
            }
            Err(err) => CommandOutput::failure(format!("failed to run {program}: {err}")),
        }
    }
}

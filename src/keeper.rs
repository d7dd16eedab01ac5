//! # Secret Keeper
//!
//! Wires the matcher and pipeline stages into the four operations:
//!
//! | Operation | Stages                                |
//! |-----------|---------------------------------------|
//! | `Match`   | match                                 |
//! | `Encrypt` | match → encrypt → diff → clean        |
//! | `Decrypt` | match → decrypt                       |
//! | `Clean`   | match → diff → clean                  |
//!
//! The encrypt workflow re-diffs after encrypting: with the `secretkeeper`
//! diff driver installed, `git diff` compares decrypted content, so a secret
//! whose value did not change diffs clean and is restored to its committed
//! ciphertext instead of showing up as a re-encrypted change.

use crate::config::{LoadedSettings, Settings};
use crate::error::Result;
use crate::matcher::FileMatcher;
use crate::pipeline::{FailureLog, FileStream, Pipeline, Reporter, RunReport};
use crate::runner::{ProcessRunner, Runner};
use crate::vault::{VaultAction, VaultTool};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Match,
    Encrypt,
    Decrypt,
    Clean,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Match => "match",
            Operation::Encrypt => "encrypt",
            Operation::Decrypt => "decrypt",
            Operation::Clean => "clean",
        };
        f.write_str(name)
    }
}

/// A started operation: its output stream plus the failures it reports
pub struct Run {
    pub output: FileStream,
    pub failures: FailureLog,
}

impl Run {
    /// Wait for the operation to finish
    pub async fn finish(mut self) -> RunReport {
        let mut report = RunReport::default();
        while let Some(file) = self.output.recv().await {
            report.processed.insert(file);
        }
        report.failures = self.failures.drain();
        report
    }
}

pub struct SecretKeeper {
    matcher: FileMatcher,
    vault: Arc<VaultTool>,
    runner: Arc<dyn Runner>,
}

impl SecretKeeper {
    pub fn new(settings: &Settings) -> Self {
        Self::with_runner(settings, Arc::new(ProcessRunner))
    }

    pub fn with_runner(settings: &Settings, runner: Arc<dyn Runner>) -> Self {
        Self {
            matcher: FileMatcher::new(settings.file_patterns.clone()),
            vault: Arc::new(settings.vault_tool()),
            runner,
        }
    }

    /// Build from loaded settings, also excluding the config file actually in use
    pub fn from_loaded(loaded: &LoadedSettings) -> Self {
        let mut keeper = Self::new(&loaded.settings);
        keeper.matcher = keeper.matcher.excluding(&loaded.path);
        keeper
    }

    pub fn vault(&self) -> &VaultTool {
        &self.vault
    }

    pub fn patterns(&self) -> &[String] {
        self.matcher.patterns()
    }

    /// Check that `op` can run at all, before any file is touched
    pub fn check(&self, op: Operation) -> Result<()> {
        match op {
            Operation::Encrypt => self.vault.validate(VaultAction::Encrypt),
            Operation::Decrypt => self.vault.validate(VaultAction::Decrypt),
            Operation::Match | Operation::Clean => Ok(()),
        }
    }

    /// Start `op` and hand back its output stream.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, op: Operation) -> Result<Run> {
        self.check(op)?;
        debug!(operation = %op, patterns = ?self.patterns(), "starting");

        let (reporter, failures) = Reporter::channel();
        let pipeline = Pipeline::new(self.runner.clone(), self.vault.clone(), reporter.clone());
        let matched = self.matcher.stream(reporter);

        let output = match op {
            Operation::Match => matched,
            Operation::Encrypt => {
                let encrypted = pipeline.encrypt(matched);
                let unchanged = pipeline.differ(encrypted);
                pipeline.clean(unchanged)
            }
            Operation::Decrypt => pipeline.decrypt(matched),
            Operation::Clean => {
                let unchanged = pipeline.differ(matched);
                pipeline.clean(unchanged)
            }
        };

        Ok(Run { output, failures })
    }

    /// Run `op` to completion
    pub async fn run(&self, op: Operation) -> Result<RunReport> {
        Ok(self.start(op)?.finish().await)
    }
}

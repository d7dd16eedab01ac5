//! # File Matcher
//!
//! Expands the configured glob patterns into candidate secret files. Patterns
//! are walked in order on a blocking task and the paths are streamed out as
//! they are found, so downstream stages start working before the walk is done.
//!
//! - A malformed pattern is reported and skipped; the other patterns still run.
//! - The config file itself is never yielded, whichever pattern matched it.
//! - Directories are not candidates.
//! - The same file can come out more than once if several patterns match it.

use crate::config::CONFIG_FILE_NAME;
use crate::pipeline::{FailureTarget, FileStream, Reporter, Stage, STREAM_CAPACITY};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FileMatcher {
    patterns: Vec<String>,
    config_path: Option<PathBuf>,
}

impl FileMatcher {
    pub fn new(patterns: Vec<String>) -> Self {
        Self {
            patterns,
            config_path: None,
        }
    }

    /// Also exclude the config file at this exact path
    pub fn excluding(mut self, config_path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(config_path.into());
        self
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    fn is_config_file(&self, path: &Path) -> bool {
        if path.file_name().is_some_and(|name| name == CONFIG_FILE_NAME) {
            return true;
        }
        self.config_path
            .as_deref()
            .is_some_and(|config| same_file(config, path))
    }

    /// Start walking the patterns.
    ///
    /// Must be called from within a tokio runtime.
    pub fn stream(&self, reporter: Reporter) -> FileStream {
        let (tx, rx) = mpsc::channel(STREAM_CAPACITY);
        let matcher = self.clone();

        tokio::task::spawn_blocking(move || {
            for pattern in &matcher.patterns {
                let entries = match glob::glob(pattern) {
                    Ok(entries) => entries,
                    Err(err) => {
                        reporter.report(
                            FailureTarget::Pattern(pattern.clone()),
                            Stage::Match,
                            format!("invalid pattern: {err}"),
                        );
                        continue;
                    }
                };

                let mut matched = 0usize;
                for entry in entries {
                    let path = match entry {
                        Ok(path) => path,
                        Err(err) => {
                            reporter.report(
                                FailureTarget::File(err.path().to_path_buf()),
                                Stage::Match,
                                err.error().to_string(),
                            );
                            continue;
                        }
                    };

                    if !path.is_file() {
                        continue;
                    }
                    if matcher.is_config_file(&path) {
                        debug!(file = %path.display(), "skipping config file");
                        continue;
                    }

                    matched += 1;
                    if tx.blocking_send(path).is_err() {
                        // Receiver gone, nobody is listening anymore.
                        return;
                    }
                }
                debug!(pattern = %pattern, matched, "pattern expanded");
            }
        });

        rx
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

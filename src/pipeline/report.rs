use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Pipeline stage a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Match,
    Diff,
    History,
    Restore,
    Encrypt,
    Decrypt,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Match => "match",
            Stage::Diff => "diff",
            Stage::History => "history",
            Stage::Restore => "restore",
            Stage::Encrypt => "encrypt",
            Stage::Decrypt => "decrypt",
        };
        f.write_str(name)
    }
}

/// What a failure is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureTarget {
    Pattern(String),
    File(PathBuf),
    Batch(Vec<PathBuf>),
}

impl fmt::Display for FailureTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureTarget::Pattern(pattern) => write!(f, "pattern {pattern}"),
            FailureTarget::File(path) => write!(f, "{}", path.display()),
            FailureTarget::Batch(paths) => write!(f, "{} file(s)", paths.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub target: FailureTarget,
    pub stage: Stage,
    /// Error text or captured command output
    pub detail: String,
}

/// Sending half handed to every stage.
///
/// Reporting logs the failure and records it for the run's [`RunReport`].
#[derive(Debug, Clone)]
pub struct Reporter {
    tx: mpsc::UnboundedSender<Failure>,
}

/// Receiving half, drained once the run's output stream has ended
#[derive(Debug)]
pub struct FailureLog {
    rx: mpsc::UnboundedReceiver<Failure>,
}

impl Reporter {
    pub fn channel() -> (Reporter, FailureLog) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Reporter { tx }, FailureLog { rx })
    }

    pub fn report(&self, target: FailureTarget, stage: Stage, detail: impl Into<String>) {
        let detail = detail.into();
        error!(stage = %stage, target = %target, "{stage} failed");
        if !detail.is_empty() {
            debug!(stage = %stage, target = %target, output = %detail, "failure detail");
        }
        // A dropped log just means nobody asked for a report.
        let _ = self.tx.send(Failure {
            target,
            stage,
            detail,
        });
    }
}

impl FailureLog {
    /// Take every failure reported so far
    pub fn drain(mut self) -> Vec<Failure> {
        let mut failures = Vec::new();
        while let Ok(failure) = self.rx.try_recv() {
            failures.push(failure);
        }
        failures
    }
}

/// Terminal result of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Files carried through to the end of the pipeline
    pub processed: BTreeSet<PathBuf>,
    pub failures: Vec<Failure>,
}

impl RunReport {
    /// Files that produced an execution error in any stage
    pub fn failed_files(&self) -> BTreeSet<PathBuf> {
        self.failures
            .iter()
            .flat_map(|failure| match &failure.target {
                FailureTarget::Pattern(_) => Vec::new(),
                FailureTarget::File(path) => vec![path.clone()],
                FailureTarget::Batch(paths) => paths.clone(),
            })
            .collect()
    }

    /// Failures from one stage only
    pub fn failures_in(&self, stage: Stage) -> impl Iterator<Item = &Failure> {
        self.failures.iter().filter(move |f| f.stage == stage)
    }
}

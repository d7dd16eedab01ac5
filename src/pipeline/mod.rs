//! # Pipeline
//!
//! Files flow between stages as a [`FileStream`]: a channel of paths that is
//! closed only after every producer of the stage has finished. A path showing
//! up on a stage's output *is* the signal that it passed that stage.
//!
//! ```text
//! match ─► encrypt ─► diff ─► clean        (encrypt workflow)
//! match ─► decrypt                         (decrypt workflow)
//! match ─► diff ─► clean                   (clean workflow)
//! ```
//!
//! Per-file stages ([`Pipeline::differ`], [`Pipeline::encrypt`],
//! [`Pipeline::decrypt`]) spawn one task per file and join them all before
//! closing their output. Output order across files is not deterministic.
//!
//! [`Pipeline::clean`] is different: `git restore` mutates the index, so the
//! cleaner collects the whole batch and issues a single restore for it.
//!
//! Failures never abort sibling files. They are logged and sent to the run's
//! [`Reporter`], and the affected file simply does not appear downstream.

mod cleaner;
mod differ;
mod report;
mod vault;

pub use report::{Failure, FailureLog, FailureTarget, Reporter, RunReport, Stage};

use crate::runner::Runner;
use crate::vault::VaultTool;
use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error};

/// Buffered paths per stage before producers wait for the consumer
pub const STREAM_CAPACITY: usize = 128;

/// Lazy, finite, non-restartable sequence of file paths
pub type FileStream = mpsc::Receiver<PathBuf>;

/// Stage operations sharing one runner, vault tool and failure reporter
#[derive(Clone)]
pub struct Pipeline {
    runner: Arc<dyn Runner>,
    vault: Arc<VaultTool>,
    reporter: Reporter,
}

impl Pipeline {
    pub fn new(runner: Arc<dyn Runner>, vault: Arc<VaultTool>, reporter: Reporter) -> Self {
        Self {
            runner,
            vault,
            reporter,
        }
    }
}

/// Run `task` for every distinct path on `input`, concurrently.
///
/// Paths for which the task yields `Some` are forwarded. The returned stream
/// closes after the input is exhausted and every spawned task has completed.
/// A path seen twice is only dispatched once.
pub(crate) fn fan_out<F, Fut>(stage: Stage, mut input: FileStream, task: F) -> FileStream
where
    F: Fn(PathBuf) -> Fut + Send + 'static,
    Fut: Future<Output = Option<PathBuf>> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(STREAM_CAPACITY);

    tokio::spawn(async move {
        let mut dispatched = HashSet::new();
        let mut tasks = JoinSet::new();

        while let Some(path) = input.recv().await {
            if !dispatched.insert(path.clone()) {
                debug!(stage = %stage, file = %path.display(), "skipping duplicate");
                continue;
            }

            let tx = tx.clone();
            let work = task(path);
            tasks.spawn(async move {
                if let Some(path) = work.await {
                    let _ = tx.send(path).await;
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                error!(stage = %stage, error = %err, "task did not complete");
            }
        }
        debug!(stage = %stage, files = dispatched.len(), "stage finished");
    });

    rx
}

/// Drain a stream into a vector, in arrival order
pub async fn collect(mut stream: FileStream) -> Vec<PathBuf> {
    let mut files = Vec::new();
    while let Some(path) = stream.recv().await {
        files.push(path);
    }
    files
}

/// Stream that yields exactly `files`, then closes
pub fn stream_of<I>(files: I) -> FileStream
where
    I: IntoIterator<Item = PathBuf>,
{
    let files: Vec<PathBuf> = files.into_iter().collect();
    let (tx, rx) = mpsc::channel(files.len().max(1));
    for file in files {
        // Capacity covers every file, so this never waits.
        let _ = tx.try_send(file);
    }
    rx
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted [`Runner`] for stage tests.

    use crate::runner::{CommandOutput, Runner};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Call {
        pub program: String,
        pub args: Vec<String>,
        pub targets: Vec<PathBuf>,
    }

    impl Call {
        pub fn subcommand(&self) -> &str {
            self.args.first().map(String::as_str).unwrap_or("")
        }
    }

    type Script = dyn Fn(&Call) -> CommandOutput + Send + Sync;

    pub struct ScriptedRunner {
        script: Box<Script>,
        calls: Mutex<Vec<Call>>,
    }

    impl ScriptedRunner {
        pub fn new(script: impl Fn(&Call) -> CommandOutput + Send + Sync + 'static) -> Self {
            Self {
                script: Box::new(script),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn calls_to(&self, subcommand: &str) -> Vec<Call> {
            self.calls()
                .into_iter()
                .filter(|call| call.subcommand() == subcommand)
                .collect()
        }
    }

    #[async_trait]
    impl Runner for ScriptedRunner {
        async fn run(&self, program: &str, args: &[String], targets: &[PathBuf]) -> CommandOutput {
            let call = Call {
                program: program.to_string(),
                args: args.to_vec(),
                targets: targets.to_vec(),
            };
            let output = (self.script)(&call);
            self.calls.lock().unwrap().push(call);
            output
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fan_out_joins_before_closing() {
        let input = stream_of((0..50).map(|i| PathBuf::from(format!("{i}.secret"))));
        let output = fan_out(Stage::Encrypt, input, |path| async move {
            // Later files finish first.
            let n: u64 = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(50 - n)).await;
            Some(path)
        });

        let files = collect(output).await;
        assert_eq!(files.len(), 50);
    }

    #[tokio::test]
    async fn test_fan_out_filters() {
        let input = stream_of(vec![PathBuf::from("keep"), PathBuf::from("drop")]);
        let output = fan_out(Stage::Diff, input, |path| async move {
            (path == PathBuf::from("keep")).then_some(path)
        });

        assert_eq!(collect(output).await, vec![PathBuf::from("keep")]);
    }

    #[tokio::test]
    async fn test_fan_out_dispatches_duplicates_once() {
        let counter = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let seen = counter.clone();
        let input = stream_of(vec![
            PathBuf::from("a.secret"),
            PathBuf::from("a.secret"),
            PathBuf::from("b.secret"),
        ]);
        let output = fan_out(Stage::Encrypt, input, move |path| {
            seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            async move { Some(path) }
        });

        let mut files = collect(output).await;
        files.sort();
        assert_eq!(files, vec![PathBuf::from("a.secret"), PathBuf::from("b.secret")]);
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stream_of_empty() {
        assert!(collect(stream_of(Vec::new())).await.is_empty());
    }
}

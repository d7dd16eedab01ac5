use super::{fan_out, FailureTarget, FileStream, Pipeline, Stage, STREAM_CAPACITY};
use crate::git::{self, GIT};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, info};

impl Pipeline {
    /// Restore unchanged files to their committed content.
    ///
    /// Files without any committed history are left alone. Everything else is
    /// collected into one batch and restored with a single `git restore`,
    /// since concurrent restores race on the index lock. The batch is
    /// forwarded whether or not the restore succeeded.
    pub fn clean(&self, files: FileStream) -> FileStream {
        let (tx, rx) = mpsc::channel(STREAM_CAPACITY);
        let runner = self.runner.clone();
        let reporter = self.reporter.clone();
        let mut restorable = self.with_history(files);

        tokio::spawn(async move {
            let mut batch = BTreeSet::new();
            while let Some(file) = restorable.recv().await {
                batch.insert(file);
            }
            if batch.is_empty() {
                debug!("nothing to restore");
                return;
            }

            let batch: Vec<PathBuf> = batch.into_iter().collect();
            info!(files = batch.len(), "restoring unchanged files");
            let out = runner.run(GIT, &git::restore_args(), &batch).await;
            if !out.success {
                reporter.report(FailureTarget::Batch(batch.clone()), Stage::Restore, out.text());
            }

            for file in batch {
                if tx.send(file).await.is_err() {
                    break;
                }
            }
        });

        rx
    }

    /// Forward only files that have at least one committed revision
    fn with_history(&self, files: FileStream) -> FileStream {
        let runner = self.runner.clone();
        let reporter = self.reporter.clone();

        fan_out(Stage::History, files, move |file| {
            let runner = runner.clone();
            let reporter = reporter.clone();
            async move {
                let out = runner
                    .run(GIT, &git::history_args(), std::slice::from_ref(&file))
                    .await;

                if !out.success {
                    reporter.report(FailureTarget::File(file), Stage::History, out.text());
                    return None;
                }
                if out.is_empty() {
                    debug!(file = %file.display(), "no committed history, not restoring");
                    return None;
                }
                Some(file)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::ScriptedRunner;
    use super::super::{collect, stream_of, FailureLog, Reporter};
    use super::*;
    use crate::runner::CommandOutput;
    use crate::vault::VaultTool;
    use std::sync::Arc;

    fn pipeline(runner: Arc<ScriptedRunner>) -> (Pipeline, FailureLog) {
        let (reporter, log) = Reporter::channel();
        (
            Pipeline::new(runner, Arc::new(VaultTool::default()), reporter),
            log,
        )
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    /// Every file except `new.secret` has history; restore exits with `restore_ok`.
    fn git_script(restore_ok: bool) -> ScriptedRunner {
        ScriptedRunner::new(move |call| match call.subcommand() {
            "log" if call.targets[0] == PathBuf::from("new.secret") => CommandOutput::success(""),
            "log" => CommandOutput::success("3f1c2a9\n"),
            "restore" if restore_ok => CommandOutput::success(""),
            "restore" => CommandOutput::failure("fatal: Unable to create index.lock"),
            other => panic!("unexpected git {other}"),
        })
    }

    #[tokio::test]
    async fn test_single_batched_restore() {
        let runner = Arc::new(git_script(true));
        let (pipeline, log) = pipeline(runner.clone());

        let input = stream_of(paths(&["c.secret", "a.secret", "b.secret"]));
        let files = collect(pipeline.clean(input)).await;

        assert_eq!(files, paths(&["a.secret", "b.secret", "c.secret"]));
        let restores = runner.calls_to("restore");
        assert_eq!(restores.len(), 1);
        assert_eq!(restores[0].args, vec!["restore", "--"]);
        assert_eq!(restores[0].targets, paths(&["a.secret", "b.secret", "c.secret"]));
        assert!(log.drain().is_empty());
    }

    #[tokio::test]
    async fn test_files_without_history_are_not_restored() {
        let runner = Arc::new(git_script(true));
        let (pipeline, _log) = pipeline(runner.clone());

        let input = stream_of(paths(&["a.secret", "new.secret"]));
        let files = collect(pipeline.clean(input)).await;

        assert_eq!(files, paths(&["a.secret"]));
        let restores = runner.calls_to("restore");
        assert_eq!(restores.len(), 1);
        assert_eq!(restores[0].targets, paths(&["a.secret"]));
    }

    #[tokio::test]
    async fn test_no_restore_when_nothing_qualifies() {
        let runner = Arc::new(git_script(true));
        let (pipeline, _log) = pipeline(runner.clone());

        let files = collect(pipeline.clean(stream_of(paths(&["new.secret"])))).await;

        assert!(files.is_empty());
        assert!(runner.calls_to("restore").is_empty());
    }

    #[tokio::test]
    async fn test_duplicates_restored_once() {
        let runner = Arc::new(git_script(true));
        let (pipeline, _log) = pipeline(runner.clone());

        let input = stream_of(paths(&["a.secret", "a.secret", "b.secret"]));
        let files = collect(pipeline.clean(input)).await;

        assert_eq!(files, paths(&["a.secret", "b.secret"]));
        assert_eq!(runner.calls_to("restore")[0].targets, paths(&["a.secret", "b.secret"]));
        assert_eq!(runner.calls_to("log").len(), 2);
    }

    #[tokio::test]
    async fn test_failed_restore_reported_once_and_batch_forwarded() {
        let runner = Arc::new(git_script(false));
        let (pipeline, log) = pipeline(runner.clone());

        let input = stream_of(paths(&["a.secret", "b.secret"]));
        let files = collect(pipeline.clean(input)).await;

        assert_eq!(files, paths(&["a.secret", "b.secret"]));
        let failures = log.drain();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].stage, Stage::Restore);
        assert_eq!(
            failures[0].target,
            FailureTarget::Batch(paths(&["a.secret", "b.secret"]))
        );
        assert!(failures[0].detail.contains("index.lock"));
    }

    #[tokio::test]
    async fn test_failed_history_query_excludes_file() {
        let runner = Arc::new(ScriptedRunner::new(|call| match call.subcommand() {
            "log" if call.targets[0] == PathBuf::from("bad.secret") => {
                CommandOutput::failure("fatal: bad revision")
            }
            _ => CommandOutput::success("3f1c2a9\n"),
        }));
        let (pipeline, log) = pipeline(runner.clone());

        let files = collect(pipeline.clean(stream_of(paths(&["bad.secret", "ok.secret"])))).await;

        assert_eq!(files, paths(&["ok.secret"]));
        assert_eq!(runner.calls_to("restore")[0].targets, paths(&["ok.secret"]));
        assert_eq!(log.drain()[0].stage, Stage::History);
    }
}

use super::{fan_out, FailureTarget, FileStream, Pipeline, Stage};
use crate::git::{self, GIT};
use tracing::debug;

impl Pipeline {
    /// Forward only the files whose working copy matches what git tracks.
    ///
    /// A file whose `git diff` fails is reported and not forwarded: it was not
    /// confirmed unchanged, so it must not be restored.
    pub fn differ(&self, files: FileStream) -> FileStream {
        let runner = self.runner.clone();
        let reporter = self.reporter.clone();

        fan_out(Stage::Diff, files, move |file| {
            let runner = runner.clone();
            let reporter = reporter.clone();
            async move {
                let out = runner
                    .run(GIT, &git::diff_args(), std::slice::from_ref(&file))
                    .await;

                if !out.success {
                    reporter.report(FailureTarget::File(file), Stage::Diff, out.text());
                    return None;
                }
                if out.is_empty() {
                    debug!(file = %file.display(), "unchanged");
                    Some(file)
                } else {
                    debug!(file = %file.display(), "changed");
                    None
                }
            }
        })
    }
}

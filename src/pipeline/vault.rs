use super::{fan_out, FailureTarget, FileStream, Pipeline, Stage};
use crate::vault::VaultAction;
use tracing::debug;

impl Pipeline {
    /// Encrypt every file with the vault tool
    pub fn encrypt(&self, files: FileStream) -> FileStream {
        self.vault_stage(VaultAction::Encrypt, files)
    }

    /// Decrypt every file with the vault tool
    pub fn decrypt(&self, files: FileStream) -> FileStream {
        self.vault_stage(VaultAction::Decrypt, files)
    }

    /// `<tool> <args...> <file>` per file; only successes are forwarded
    fn vault_stage(&self, action: VaultAction, files: FileStream) -> FileStream {
        let stage = match action {
            VaultAction::Encrypt => Stage::Encrypt,
            VaultAction::Decrypt => Stage::Decrypt,
        };
        let runner = self.runner.clone();
        let vault = self.vault.clone();
        let reporter = self.reporter.clone();

        fan_out(stage, files, move |file| {
            let runner = runner.clone();
            let vault = vault.clone();
            let reporter = reporter.clone();
            async move {
                let out = runner
                    .run(&vault.tool, vault.args(action), std::slice::from_ref(&file))
                    .await;

                if out.success {
                    debug!(file = %file.display(), "{action}ed");
                    Some(file)
                } else {
                    reporter.report(FailureTarget::File(file), stage, out.text());
                    None
                }
            }
        })
    }
}

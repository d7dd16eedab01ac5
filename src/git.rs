use crate::error::{Result, SecretKeeperError};
use crate::vault::VaultTool;
use git2::Repository;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// git executable used by the pipeline stages
pub const GIT: &str = "git";

/// Name of the diff driver wired up by `secret-keeper init`
pub const DIFF_DRIVER: &str = "secretkeeper";

const GENERATED_HEADER: &str = "# This file is auto-generated by secret-keeper\n# Do not edit this file\n";

const PRE_COMMIT_HOOK: &str = r#"#!/bin/sh
# This file is auto-generated by secret-keeper
# It ensures that secrets are encrypted before committing.

secret-keeper encrypt
if [ $? -ne 0 ]; then
  echo "Pre-commit hook failed: secret-keeper encrypt encountered an error."
  exit 1
fi

exit 0
"#;

/// `git diff -- <file>`: empty output means the working copy matches the index
pub fn diff_args() -> Vec<String> {
    vec!["diff".into(), "--".into()]
}

/// `git log -n 1 --format=%H -- <file>`: non-empty output means committed history
pub fn history_args() -> Vec<String> {
    vec![
        "log".into(),
        "-n".into(),
        "1".into(),
        "--format=%H".into(),
        "--".into(),
    ]
}

/// `git restore -- <files...>`
pub fn restore_args() -> Vec<String> {
    vec!["restore".into(), "--".into()]
}

pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    /// Open repository at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|_| SecretKeeperError::NotInGitRepo)?;
        Ok(Self { repo })
    }

    /// Get the git directory path
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Get repository root path
    pub fn workdir(&self) -> Result<&Path> {
        self.repo.workdir().ok_or(SecretKeeperError::Other(
            "Repository has no working directory".into(),
        ))
    }

    pub fn attributes_path(&self) -> Result<PathBuf> {
        Ok(self.workdir()?.join(".gitattributes"))
    }

    pub fn pre_commit_hook_path(&self) -> PathBuf {
        self.git_dir().join("hooks").join("pre-commit")
    }

    /// Mark every secret pattern with the secret-keeper diff driver.
    ///
    /// Overwrites `.gitattributes`; the file is owned by secret-keeper.
    pub fn write_attributes(&self, patterns: &[String]) -> Result<PathBuf> {
        let path = self.attributes_path()?;
        let mut file = fs::File::create(&path)?;
        file.write_all(GENERATED_HEADER.as_bytes())?;
        for pattern in patterns {
            writeln!(file, "{pattern} diff={DIFF_DRIVER}")?;
        }
        Ok(path)
    }

    /// Let `git diff` compare decrypted content of secret files
    pub fn configure_diff_driver(&self, vault: &VaultTool) -> Result<()> {
        if vault.tool.trim().is_empty() {
            return Err(SecretKeeperError::VaultToolMissing);
        }

        let mut config = self.repo.config()?;
        config.set_str(
            &format!("diff.{DIFF_DRIVER}.textconv"),
            &vault.view_command(),
        )?;

        Ok(())
    }

    /// Install the pre-commit hook that runs `secret-keeper encrypt`
    pub fn install_pre_commit_hook(&self) -> Result<PathBuf> {
        let hook_path = self.pre_commit_hook_path();
        if let Some(hooks_dir) = hook_path.parent() {
            fs::create_dir_all(hooks_dir)?;
        }
        fs::write(&hook_path, PRE_COMMIT_HOOK)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&hook_path, fs::Permissions::from_mode(0o755))?;
        }

        Ok(hook_path)
    }
}

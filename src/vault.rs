//! # Vault Tool
//!
//! The external executable that does the actual encryption, e.g. `ansible-vault`
//! or `sops`. secret-keeper never touches key material; it only knows how to
//! invoke the tool:
//!
//! ```text
//! <vault_tool> <encrypt_args...> <file>
//! <vault_tool> <decrypt_args...> <file>
//! ```
//!
//! `view_args` are only used to render the git diff driver (see [`crate::git`]),
//! which lets `git diff` compare decrypted content.

use crate::error::{Result, SecretKeeperError};
use std::fmt;

/// Which direction the vault tool is run in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VaultAction {
    Encrypt,
    Decrypt,
}

impl fmt::Display for VaultAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultAction::Encrypt => f.write_str("encrypt"),
            VaultAction::Decrypt => f.write_str("decrypt"),
        }
    }
}

/// Executable name and argument templates, fixed for the lifetime of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultTool {
    pub tool: String,
    pub encrypt_args: Vec<String>,
    pub decrypt_args: Vec<String>,
    pub view_args: Vec<String>,
}

impl VaultTool {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            ..Self::default()
        }
    }

    pub fn with_encrypt_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.encrypt_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_decrypt_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.decrypt_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_view_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.view_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Argument template for the given action
    pub fn args(&self, action: VaultAction) -> &[String] {
        match action {
            VaultAction::Encrypt => &self.encrypt_args,
            VaultAction::Decrypt => &self.decrypt_args,
        }
    }

    /// Check that the tool can be run for `action` at all.
    ///
    /// Must pass before any file is handed to the tool.
    pub fn validate(&self, action: VaultAction) -> Result<()> {
        if self.tool.trim().is_empty() {
            return Err(SecretKeeperError::VaultToolMissing);
        }
        if self.args(action).is_empty() {
            return Err(SecretKeeperError::MissingArgs(action));
        }
        Ok(())
    }

    /// Command line git runs to render a secret for diffing
    pub fn view_command(&self) -> String {
        std::iter::once(self.tool.as_str())
            .chain(self.view_args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

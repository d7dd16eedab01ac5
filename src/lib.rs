//! # secret-keeper
//!
//! Keeps secret files in a git repository encrypted with an external vault
//! tool (`ansible-vault`, `sops`, ...) without re-encryption churn.
//!
//! Most vault tools produce different ciphertext every time they encrypt, so
//! encrypting every secret before a commit would show every secret as
//! changed. secret-keeper encrypts them all, then asks git which ones really
//! changed (comparing decrypted content through a diff driver) and restores
//! the rest to their committed ciphertext.
//!
//! ## Quick Start
//!
//! ```bash
//! cat > config.secret-keeper.yaml << 'EOF'
//! secret_files_patterns:
//!   - "group_vars/*/vault.yml"
//! vault_tool: ansible-vault
//! encrypt_args: ["encrypt", "--vault-password-file", ".vault-pass"]
//! decrypt_args: ["decrypt", "--vault-password-file", ".vault-pass"]
//! view_args: ["view", "--vault-password-file", ".vault-pass"]
//! EOF
//!
//! # Write .gitattributes, the diff driver and the pre-commit hook
//! secret-keeper init
//!
//! # Work on plaintext
//! secret-keeper decrypt
//!
//! # Commit: the hook runs `secret-keeper encrypt`
//! git commit -am "Rotate database password"
//! ```
//!
//! ## Commands
//!
//! - `init` - Write `.gitattributes`, configure the `secretkeeper` diff driver, install the pre-commit hook
//! - `encrypt` - Encrypt every secret, then restore the ones that did not change
//! - `decrypt` - Decrypt every secret in place
//! - `clean` - Restore secrets whose content matches what is committed
//! - `list` - Print the files the patterns match
//!
//! ## Module Overview
//!
//! - [`matcher`] - Glob expansion into candidate files
//! - [`pipeline`] - Concurrent diff, clean, encrypt and decrypt stages
//! - [`keeper`] - The operations, built from the stages
//! - [`runner`] - External process execution
//! - [`vault`] - Vault tool invocation settings
//! - [`git`] - Repository setup and the git commands the stages run
//! - [`config`] - Config file discovery and loading
//! - [`error`] - Error types and unified error handling
//!
//! ## Testing
//!
//! ```bash
//! # Unit tests (scripted runner, no git needed)
//! cargo test --lib
//!
//! # End-to-end tests against real repositories
//! cargo test --test integration_test
//! ```

pub mod config;
pub mod error;
pub mod git;
pub mod keeper;
pub mod logging;
pub mod matcher;
pub mod pipeline;
pub mod runner;
pub mod vault;

// Re-export commonly used types
pub use crate::config::Settings;
pub use crate::error::{Result, SecretKeeperError};
pub use crate::keeper::{Operation, SecretKeeper};
pub use crate::pipeline::RunReport;
pub use crate::vault::{VaultAction, VaultTool};

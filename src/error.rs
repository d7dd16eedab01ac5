use crate::vault::VaultAction;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SecretKeeperError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Config file not found. Looked in: {0}")]
    ConfigNotFound(String),

    #[error("Vault tool not defined. Set 'vault_tool' in the config file")]
    VaultToolMissing,

    #[error("No {0} arguments defined for the vault tool. Set '{0}_args' in the config file")]
    MissingArgs(VaultAction),

    #[error("Not in a git repository")]
    NotInGitRepo,

    #[error("Vault tool failed to {action} {count} file(s)")]
    Incomplete { action: VaultAction, count: usize },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SecretKeeperError>;

//! # Configuration
//!
//! secret-keeper reads a single YAML file, `config.secret-keeper.yaml`:
//!
//! ```yaml
//! secret_files_patterns:
//!   - "group_vars/*/vault.yml"
//!   - "*.secret"
//! vault_tool: ansible-vault
//! encrypt_args: ["encrypt", "--vault-password-file", ".vault-pass"]
//! decrypt_args: ["decrypt", "--vault-password-file", ".vault-pass"]
//! view_args: ["view", "--vault-password-file", ".vault-pass"]
//! debug: false
//! ```
//!
//! The file is looked up in the current directory, then `~/.secret-keeper/`,
//! then `/etc/secret-keeper/`, unless an explicit path is given. Any key can
//! be overridden from the environment with the `SECRET_KEEPER_` prefix, e.g.
//! `SECRET_KEEPER_VAULT_TOOL=sops`. List values are comma separated.

use crate::error::{Result, SecretKeeperError};
use crate::vault::VaultTool;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.secret-keeper.yaml";

const ENV_PREFIX: &str = "SECRET_KEEPER";
const LIST_KEYS: [&str; 4] = [
    "secret_files_patterns",
    "encrypt_args",
    "decrypt_args",
    "view_args",
];

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default, rename = "secret_files_patterns")]
    pub file_patterns: Vec<String>,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub vault_tool: String,
    #[serde(default)]
    pub encrypt_args: Vec<String>,
    #[serde(default)]
    pub decrypt_args: Vec<String>,
    #[serde(default)]
    pub view_args: Vec<String>,
}

/// Settings together with the file they were read from
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub path: PathBuf,
}

impl Settings {
    /// Locate and load the config file.
    pub fn load(explicit: Option<&Path>) -> Result<LoadedSettings> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => Self::discover()?,
        };
        let settings = Self::from_file(&path)?;
        Ok(LoadedSettings { settings, path })
    }

    /// Read one config file, with environment overrides applied on top
    pub fn from_file(path: &Path) -> Result<Self> {
        let path_str = path
            .to_str()
            .ok_or_else(|| SecretKeeperError::Other("Invalid config path".into()))?;

        let mut env = Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(",");
        for key in LIST_KEYS {
            env = env.with_list_parse_key(key);
        }

        let cfg = Config::builder()
            .add_source(File::new(path_str, FileFormat::Yaml))
            .add_source(env)
            .build()?;

        Ok(cfg.try_deserialize()?)
    }

    /// Candidate locations, in lookup order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".secret-keeper").join(CONFIG_FILE_NAME));
        }
        paths.push(PathBuf::from("/etc/secret-keeper").join(CONFIG_FILE_NAME));
        paths
    }

    fn discover() -> Result<PathBuf> {
        let candidates = Self::search_paths();
        candidates
            .iter()
            .find(|path| path.is_file())
            .cloned()
            .ok_or_else(|| {
                SecretKeeperError::ConfigNotFound(
                    candidates
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                )
            })
    }

    pub fn vault_tool(&self) -> VaultTool {
        VaultTool {
            tool: self.vault_tool.clone(),
            encrypt_args: self.encrypt_args.clone(),
            decrypt_args: self.decrypt_args.clone(),
            view_args: self.view_args.clone(),
        }
    }
}

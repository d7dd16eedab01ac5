use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::fs;
use std::path::Path;
use std::process::Command as StdCommand;
use tempfile::TempDir;

/// rot13 "vault": deterministic, so unchanged plaintext encrypts to identical bytes.
/// Refuses files containing FAIL to simulate a broken invocation.
const VAULT_SCRIPT: &str = r#"#!/bin/sh
if grep -q FAIL "$1"; then
  echo "refusing to process $1" >&2
  exit 1
fi
tr 'A-Za-z' 'N-ZA-Mn-za-m' < "$1" > "$1.tmp" && mv "$1.tmp" "$1"
"#;

/// Create a new temporary git repository with user config set.
pub fn create_git_repo() -> TempDir {
    let temp = TempDir::new().expect("failed to create temp dir");

    git(temp.path(), &["init"]);
    git(temp.path(), &["config", "user.email", "test@example.com"]);
    git(temp.path(), &["config", "user.name", "Test User"]);

    temp
}

/// Run git in `dir`, returning stdout
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = StdCommand::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stage and commit `files`
pub fn commit(dir: &Path, files: &[&str], message: &str) {
    let mut args = vec!["add", "--"];
    args.extend_from_slice(files);
    git(dir, &args);
    git(dir, &["commit", "-m", message]);
}

/// Porcelain status limited to `files`
pub fn status(dir: &Path, files: &[&str]) -> String {
    let mut args = vec!["status", "--porcelain", "--"];
    args.extend_from_slice(files);
    git(dir, &args)
}

/// Write the rot13 vault script and a config using it
pub fn write_rot13_config(dir: &Path, patterns: &[&str]) {
    fs::write(dir.join("vault.sh"), VAULT_SCRIPT).expect("failed to write vault script");
    write_config(dir, patterns, "sh", "[\"vault.sh\"]");
}

pub fn write_config(dir: &Path, patterns: &[&str], tool: &str, args: &str) {
    let patterns = patterns
        .iter()
        .map(|p| format!("  - \"{p}\"\n"))
        .collect::<String>();
    let config = format!(
        "secret_files_patterns:\n{patterns}vault_tool: \"{tool}\"\nencrypt_args: {args}\ndecrypt_args: {args}\nview_args: [\"view\"]\n"
    );
    fs::write(dir.join("config.secret-keeper.yaml"), config).expect("failed to write config");
}

pub fn rot13(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'a'..='z' => (((c as u8 - b'a') + 13) % 26 + b'a') as char,
            'A'..='Z' => (((c as u8 - b'A') + 13) % 26 + b'A') as char,
            _ => c,
        })
        .collect()
}

/// Convenience helper for spawning the secret-keeper binary via assert_cmd.
pub fn secret_keeper_cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("secret-keeper");
    for var in [
        "SECRET_KEEPER_VAULT_TOOL",
        "SECRET_KEEPER_ENCRYPT_ARGS",
        "SECRET_KEEPER_DECRYPT_ARGS",
        "SECRET_KEEPER_SECRET_FILES_PATTERNS",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

use secret_keeper::config::LoadedSettings;
use secret_keeper::error::Result;
use secret_keeper::git::GitRepo;

/// Wire the repository up for secret-keeper
pub fn init(loaded: &LoadedSettings) -> Result<()> {
    println!("Initializing secret-keeper...");

    // Open repository
    let repo = GitRepo::open(".")?;
    let settings = &loaded.settings;

    // Mark secret files with the diff driver
    let attributes = repo.write_attributes(&settings.file_patterns)?;
    println!("Wrote {}", attributes.display());

    // Let git diff see through the encryption
    let vault = settings.vault_tool();
    repo.configure_diff_driver(&vault)?;
    println!("Configured git diff driver: {}", vault.view_command());

    let hook = repo.install_pre_commit_hook()?;
    println!("Installed pre-commit hook: {}", hook.display());

    println!("\nInitialization complete!");
    println!("\nNext steps:");
    println!("1. Commit the .gitattributes file");
    println!("2. Secrets are now encrypted automatically before every commit");

    Ok(())
}

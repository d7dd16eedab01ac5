use secret_keeper::error::{Result, SecretKeeperError};
use secret_keeper::git::GitRepo;
use secret_keeper::pipeline::Stage;
use secret_keeper::vault::VaultAction;
use secret_keeper::{Operation, SecretKeeper};

/// Encrypt all secrets, then restore the ones whose content did not change
pub async fn encrypt(keeper: &SecretKeeper) -> Result<()> {
    // Restoring needs a repository; fail before encrypting anything.
    keeper.check(Operation::Encrypt)?;
    GitRepo::open(".")?;

    println!("Encrypting secrets...");
    let report = keeper.run(Operation::Encrypt).await?;

    for file in &report.processed {
        println!("unchanged, restored: {}", file.display());
    }

    let failed = report.failures_in(Stage::Encrypt).count();
    if failed > 0 {
        return Err(SecretKeeperError::Incomplete {
            action: VaultAction::Encrypt,
            count: failed,
        });
    }

    println!("Secrets encrypted!");
    Ok(())
}

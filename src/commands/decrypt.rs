use secret_keeper::error::{Result, SecretKeeperError};
use secret_keeper::pipeline::Stage;
use secret_keeper::vault::VaultAction;
use secret_keeper::{Operation, SecretKeeper};

/// Decrypt every matched secret in place
pub async fn decrypt(keeper: &SecretKeeper) -> Result<()> {
    println!("Decrypting secrets...");
    let report = keeper.run(Operation::Decrypt).await?;

    for file in &report.processed {
        println!("decrypted: {}", file.display());
    }

    let failed = report.failures_in(Stage::Decrypt).count();
    if failed > 0 {
        return Err(SecretKeeperError::Incomplete {
            action: VaultAction::Decrypt,
            count: failed,
        });
    }

    println!("Secrets decrypted!");
    println!("\nWARNING: Decrypted secrets are plaintext in your working tree.");
    println!("Run 'secret-keeper encrypt' (or commit) before sharing it.");
    Ok(())
}

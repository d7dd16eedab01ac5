use secret_keeper::error::Result;
use secret_keeper::git::GitRepo;
use secret_keeper::{Operation, SecretKeeper};

/// Restore secrets that match their committed content
pub async fn clean(keeper: &SecretKeeper) -> Result<()> {
    GitRepo::open(".")?;

    println!("Cleaning unchanged secrets...");
    let report = keeper.run(Operation::Clean).await?;

    for file in &report.processed {
        println!("restored: {}", file.display());
    }
    println!("Restored {} file(s)", report.processed.len());

    Ok(())
}

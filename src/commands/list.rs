use secret_keeper::error::Result;
use secret_keeper::{Operation, SecretKeeper};

/// Print every file the configured patterns match
pub async fn list(keeper: &SecretKeeper) -> Result<()> {
    let report = keeper.run(Operation::Match).await?;
    for file in &report.processed {
        println!("{}", file.display());
    }
    Ok(())
}

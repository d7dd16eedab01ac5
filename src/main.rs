mod commands;

use clap::{Parser, Subcommand};
use secret_keeper::config::Settings;
use secret_keeper::error::Result;
use secret_keeper::{logging, SecretKeeper};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "secret-keeper")]
#[command(version)]
#[command(about = "Keeps vault-encrypted secrets in git without re-encryption churn", long_about = None)]
struct Cli {
    /// Config file (default: ./config.secret-keeper.yaml, then ~/.secret-keeper/, then /etc/secret-keeper/)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up .gitattributes, the git diff driver and the pre-commit hook
    Init,

    /// Encrypt secrets and restore the ones that did not change
    Encrypt,

    /// Decrypt all secrets in place
    Decrypt,

    /// Restore secrets that match their committed content
    Clean,

    /// List files matching the configured patterns
    List,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Settings::load(cli.config.as_deref())?;
    logging::init(cli.debug || loaded.settings.debug);

    let keeper = SecretKeeper::from_loaded(&loaded);

    match cli.command {
        Commands::Init => commands::init(&loaded),
        Commands::Encrypt => commands::encrypt(&keeper).await,
        Commands::Decrypt => commands::decrypt(&keeper).await,
        Commands::Clean => commands::clean(&keeper).await,
        Commands::List => commands::list(&keeper).await,
    }
}

//! Postforge CLI binary.
//!
//! This binary provides command-line access to Postforge's functionality:
//! - Generate a post from a prompt
//! - Inspect the learning state kept per token

use clap::Parser;
use postforge::{LoggingConfig, init_logging};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, handle_generate, handle_state};

    // Pick up OPENROUTER_KEY and RUST_LOG from .env when present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&LoggingConfig::new(cli.verbose).with_json_logs(cli.json_logs))?;

    match cli.command {
        Commands::Generate(args) => {
            handle_generate(args, cli.config.as_deref()).await?;
        }

        Commands::State { token } => {
            handle_state(&token, cli.config.as_deref()).await?;
        }
    }

    Ok(())
}

//! Backlinks CLI - run a backlink sync from the terminal
//!
//! Wires environment configuration into a single-tenant sync task and applies
//! the task's declared retry policy, the way a job runner would.

mod cli;
mod commands;
mod error;


use backlinks_core::BacklinksConfig;
use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::sync::run_sync;
use crate::commands::url::run_url;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    // Only load .env in development; deployments inject the environment.
    #[cfg(debug_assertions)]
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("backlinks=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();
    let config = BacklinksConfig::from_env()?;
    tracing::debug!("Loaded config: {:?}", config);

    match cli.command {
        Commands::Url { path, base_url } => run_url(&path, base_url, &config)?,
        Commands::Sync(args) => run_sync(args, &config).await?,
    }

    Ok(())
}

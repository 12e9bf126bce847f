//! # policyrag: Insurance Policy Ingestion CLI
//!
//! This is the main entry point for the `policyrag` command-line interface.
//! The binary is a thin entrypoint; all logic lives in the `policyrag_cli`
//! library crate.

use anyhow::Result;
use clap::Parser;
use policyrag_cli::{run, Cli};
use tracing_subscriber::{fmt, EnvFilter};

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // 2. Setup logging (stderr, so `chunk` output on stdout stays clean)
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive("policyrag=info".parse()?))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // 3. Parse CLI arguments
    let cli = Cli::parse();

    // 4. Call the library's run function and handle the final result
    if let Err(e) = run(cli).await {
        eprintln!("[policyrag error] Failed to execute command: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}

//! Binary crate for the `skycast` command-line tool.
//!
//! This crate is the presentation surface: it captures the city the user
//! types, forwards it to the core orchestrator, and renders the resulting
//! fetch states. All lookup logic lives in `skycast-core`.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skycast=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}

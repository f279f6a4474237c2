use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use monorepo_commits::Cli;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so reports on stdout stay machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let command = cli.command_name();
    cli.execute()
        .await
        .with_context(|| format!("`monorepo-commits {command}` failed"))
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run(Cli::parse()).await {
        eprintln!("Error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("  Caused by: {cause}");
        }
        process::exit(1);
    }
}

//! Reposync CLI Binary
//!
//! Exit codes: 0 on success, 1 on a fatal error, 2 when the sync ran but some operations failed.

use anyhow::Context;
use clap::Parser;
use reposync::cli::{Cli, RunContext};
use reposync::logging::init_logging;
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    match run(cli, RunContext::new(config)) {
        Ok(true) => {}
        Ok(false) => process::exit(2),
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn run(cli: Cli, context: RunContext) -> anyhow::Result<bool> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create async runtime")?;

    info!(command = ?cli.command, "Reposync starting");
    let output = runtime
        .block_on(context.execute(&cli.command))
        .context("Command failed to complete")?;

    if !output.text.is_empty() {
        println!("{}", output.text);
    }
    Ok(output.success)
}

//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `jokes_on_tap` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use jokes_on_tap::initialization::init_logger_with;
use jokes_on_tap::{run_server, Config, Opt};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; RUST_LOG and friends may come from the environment
    let _ = dotenvy::dotenv();

    let config = Config::from(Opt::parse());

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = run_server(config).await {
        eprintln!("jokes_on_tap error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}

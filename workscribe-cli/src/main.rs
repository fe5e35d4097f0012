//! `workscribe` - command-line front end for the tracker engine
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error
//! - 2: Lock contention that outlasted the retries; safe to run again

mod cli;
mod commands;
mod logging;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, OutputFormat};
use commands::{Caller, Runner};
use serde_json::Value;
use workscribe_config::ConfigProvider;
use workscribe_tracker::{TrackerContext, TrackerError};

const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_RETRYABLE: i32 = 2;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let code = match run(cli).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code(&e)
        }
    };
    std::process::exit(code);
}

fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<TrackerError>() {
        Some(e) if e.is_retryable() => EXIT_RETRYABLE,
        _ => EXIT_ERROR,
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut provider = ConfigProvider::new();
    if let Some(path) = &cli.config {
        provider = provider.with_file(path);
    }
    let mut config = provider.load().context("failed to load configuration")?;
    if let Some(db) = cli.db {
        config.store.path = db;
    }
    tracing::debug!(db = %config.store.path.display(), "opening tracker");

    let ctx = TrackerContext::open(config)?;
    let runner = Runner::new(
        &ctx,
        Caller {
            org: cli.org,
            actor: cli.actor,
        },
    );
    let result = runner.run(cli.command).await?;
    print(&result, cli.format)
}

fn print(value: &Value, format: OutputFormat) -> anyhow::Result<()> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml_ng::to_string(value)?,
    };
    println!("{}", text.trim_end());
    Ok(())
}

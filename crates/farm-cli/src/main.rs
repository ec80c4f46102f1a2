//! `farmlog` binary entrypoint.

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use farm_cli::commands::{AssetCommand, LogCommand};
use farm_cli::{Cli, Commands, FarmContext, OutputFormat};
use farm_log::FarmLogConfig;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => FarmLogConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => FarmLogConfig::default(),
    };
    let ctx = FarmContext::open(&cli.store, &config)
        .with_context(|| format!("failed to open store {}", cli.store.display()))?;

    let format = OutputFormat::new(cli.format);
    let mut stdout = io::stdout().lock();

    match &cli.command {
        Commands::Asset { command } => {
            AssetCommand::new(&ctx).execute(&mut stdout, &format, command)?;
        }
        Commands::Log { command } => {
            LogCommand::new(&ctx).execute(&mut stdout, &format, command)?;
        }
    }

    Ok(())
}

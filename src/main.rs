use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt};

mod cli;
mod error;

use crate::cli::{Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default = match cli.verbose {
        0 => "warn,mts=info,mts_harvest=info",
        1 => "info,mts=debug,mts_harvest=debug,mts_portal=debug,mts_store=debug,mts_extract=debug",
        _ => "debug,mts=trace,mts_harvest=trace,mts_portal=trace,mts_store=trace,mts_extract=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();

    let config = match cli.config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err:?}");
            return ExitCode::FAILURE;
        },
    };
    let result = match cli.command {
        Commands::Harvest(args) => cli::harvest::execute(args, config).await,
        Commands::Programs(args) => cli::programs::execute(args, config).await,
        Commands::Status(args) => cli::status::execute(args, config).await,
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

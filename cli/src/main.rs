#![deny(missing_docs)]

//! # Restinit CLI
//!
//! Command line front-end for the OpenAPI detector.
//!
//! Supported Commands:
//! - `detect`: Resolves a document and prints the detected source description.
//! - `list`: Prints the detected endpoints with their ids, names and parents.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::CliResult;

mod detect;
mod error;
#[cfg(feature = "client")]
mod fetch;
mod list;
mod source;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI to REST source detector")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Detect pagination, payloads, keys and nesting, and print the source description.
    Detect(detect::DetectArgs),
    /// List detected endpoints.
    List(list::ListArgs),
}

fn init_tracing(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,restinit_core=info,restinit=info".to_string(),
            2 => "info,restinit_core=debug,restinit=debug".to_string(),
            _ => "debug,restinit_core=trace,restinit=trace".to_string(),
        },
    };
    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(verbose >= 2)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Detect(args) => detect::execute(args),
        Commands::List(args) => list::execute(args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

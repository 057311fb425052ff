use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    check::{self, CheckArgs},
    run::{self, RunArgs},
    tables::{self, TablesArgs},
};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "reco", about = "Reconstruction post-processing CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the configured post-processing chain over a file of events.
    Run(RunArgs),
    /// Print the standard domain tables as YAML.
    Tables(TablesArgs),
    /// Validate a post-processing configuration without processing events.
    Check(CheckArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Tables(args) => tables::run(&args),
        Command::Check(args) => check::run(&args),
    }
}

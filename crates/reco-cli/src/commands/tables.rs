use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use reco_core::serde::to_yaml_string;
use reco_core::DomainTables;

#[derive(Args, Debug)]
pub struct TablesArgs {
    /// Write the tables to this file instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Emits the standard domain tables, a starting point for custom overrides.
pub fn run(args: &TablesArgs) -> Result<(), Box<dyn Error>> {
    let yaml = to_yaml_string(&DomainTables::standard())?;
    match &args.out {
        Some(path) => fs::write(path, yaml)?,
        None => print!("{yaml}"),
    }
    Ok(())
}

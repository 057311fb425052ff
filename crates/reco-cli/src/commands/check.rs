use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use reco_post::{Pipeline, PostProcessingConfig};
use tracing::warn;

use super::load_tables;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// YAML configuration describing the post-processing chain.
    #[arg(long)]
    pub config: PathBuf,
    /// Optional YAML domain tables overriding the standard ones.
    #[arg(long)]
    pub tables: Option<PathBuf>,
}

/// Builds the pipeline to surface configuration errors, then lists its stages.
pub fn run(args: &CheckArgs) -> Result<(), Box<dyn Error>> {
    let tables = load_tables(args.tables.as_deref())?;
    let config = PostProcessingConfig::from_yaml_str(&fs::read_to_string(&args.config)?)?;
    if config.is_empty() {
        warn!("configuration enables no stage");
    }
    let pipeline = Pipeline::from_config(&tables, &config)?;
    for name in pipeline.stage_names() {
        println!("{name}");
    }
    Ok(())
}

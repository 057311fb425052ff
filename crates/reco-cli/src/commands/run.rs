use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use reco_core::serde::{events_from_json_slice, to_json_bytes};
use reco_post::{Pipeline, PostProcessingConfig};
use tracing::info;

use super::load_tables;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML configuration describing the post-processing chain.
    #[arg(long)]
    pub config: PathBuf,
    /// JSON file holding one event or an array of events.
    #[arg(long)]
    pub input: PathBuf,
    /// Output JSON file receiving the processed events.
    #[arg(long)]
    pub out: PathBuf,
    /// Optional YAML domain tables overriding the standard ones.
    #[arg(long)]
    pub tables: Option<PathBuf>,
}

/// Processes every event of the input file and writes them back as JSON.
pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let tables = load_tables(args.tables.as_deref())?;
    let config = PostProcessingConfig::from_yaml_str(&fs::read_to_string(&args.config)?)?;
    let pipeline = Pipeline::from_config(&tables, &config)?;

    let mut events = events_from_json_slice(&fs::read(&args.input)?)?;
    pipeline.process_events(&mut events)?;

    let particles: usize = events.iter().map(|event| event.particles.len()).sum();
    info!(
        events = events.len(),
        particles,
        stages = ?pipeline.stage_names(),
        "post-processing complete"
    );

    if let Some(parent) = args.out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&args.out, to_json_bytes(&events)?)?;
    Ok(())
}

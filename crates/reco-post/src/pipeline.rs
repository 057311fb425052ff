use rayon::prelude::*;
use reco_core::{DomainTables, Event, RecoError};
use tracing::{debug, info};

use crate::config::PostProcessingConfig;
use crate::momentum::MomentumProcessor;
use crate::processor::PostProcessor;
use crate::semantics::ParticleSemanticsProcessor;
use crate::thresholds::ParticlePropertiesProcessor;

/// Ordered chain of post-processing stages.
///
/// Each stage reads fields written by the previous one; the order is the
/// order of insertion.
#[derive(Default)]
pub struct Pipeline<'t> {
    stages: Vec<Box<dyn PostProcessor + 't>>,
}

impl std::fmt::Debug for Pipeline<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

impl<'t> Pipeline<'t> {
    /// Creates an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the configured stages in the order
    /// semantics, thresholds, momentum.
    pub fn from_config(
        tables: &'t DomainTables,
        config: &PostProcessingConfig,
    ) -> Result<Self, RecoError> {
        tables.validate()?;
        let mut pipeline = Self::new();
        if let Some(opts) = &config.enforce_particle_semantics {
            pipeline.push(Box::new(ParticleSemanticsProcessor::new(
                tables,
                opts.clone(),
            )));
        }
        if let Some(opts) = &config.adjust_particle_properties {
            pipeline.push(Box::new(ParticlePropertiesProcessor::new(
                tables,
                opts.clone(),
            )?));
        }
        if let Some(opts) = &config.reconstruct_momentum {
            pipeline.push(Box::new(MomentumProcessor::new(tables, opts.clone())));
        }
        info!(stages = ?pipeline.stage_names(), "post-processing pipeline ready");
        Ok(pipeline)
    }

    /// Appends a stage.
    pub fn push(&mut self, stage: Box<dyn PostProcessor + 't>) {
        self.stages.push(stage);
    }

    /// Names of the stages in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs every stage on one event, aborting on the first failure.
    pub fn process(&self, event: &mut Event) -> Result<(), RecoError> {
        event.validate()?;
        for stage in &self.stages {
            debug!(stage = stage.name(), "running stage");
            let outcome = stage
                .process(event)
                .map_err(|err| err.with_context("stage", stage.name()))?;
            event.merge_extra(outcome.data_update);
            event.merge_extra(outcome.result_update);
        }
        Ok(())
    }

    /// Processes independent events in parallel.
    ///
    /// Every event is attempted; the error of the lowest failing event index
    /// is returned.
    pub fn process_events(&self, events: &mut [Event]) -> Result<(), RecoError> {
        let results: Vec<Result<(), RecoError>> = events
            .par_iter_mut()
            .enumerate()
            .map(|(idx, event)| {
                self.process(event)
                    .map_err(|err| err.with_context("event", idx))
            })
            .collect();
        results.into_iter().collect()
    }
}

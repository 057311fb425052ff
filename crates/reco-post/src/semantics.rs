use reco_core::{DomainTables, Event, Particle, RecoError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::numerics::mask_and_renormalize;
use crate::processor::{PostProcessor, ProcessOutcome, ResultKey};

fn default_true() -> bool {
    true
}

/// Options of the semantic-consistency stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SemanticsOpts {
    /// Mask PID scores to the classes allowed by the particle's shape.
    #[serde(default = "default_true")]
    pub enforce_pid: bool,
    /// Mask primary scores to the classes allowed by the particle's shape.
    #[serde(default = "default_true")]
    pub enforce_primary: bool,
}

impl Default for SemanticsOpts {
    fn default() -> Self {
        Self {
            enforce_pid: true,
            enforce_primary: true,
        }
    }
}

/// Makes particle-level predictions consistent with the semantic shape:
/// showers only carry shower PIDs, tracks only track PIDs, and delta rays
/// and Michel electrons are secondary electrons.
#[derive(Debug, Clone)]
pub struct ParticleSemanticsProcessor<'t> {
    tables: &'t DomainTables,
    opts: SemanticsOpts,
}

impl<'t> ParticleSemanticsProcessor<'t> {
    /// Stage name used in configuration files.
    pub const NAME: &'static str = "enforce_particle_semantics";

    /// Creates the stage over the shared domain tables.
    pub fn new(tables: &'t DomainTables, opts: SemanticsOpts) -> Self {
        Self { tables, opts }
    }

    /// Options the stage was built with.
    pub fn opts(&self) -> &SemanticsOpts {
        &self.opts
    }

    fn enforce(&self, particle: &mut Particle) -> Result<(), RecoError> {
        let shape = particle.semantic_type;
        // Empty vectors carry no prediction to reconcile.
        if self.opts.enforce_pid && !particle.pid_scores.is_empty() {
            let allowed = self
                .tables
                .allowed_pid_indices(shape)
                .map_err(|err| err.with_context("particle", particle.id))?;
            let scores = mask_and_renormalize(&particle.pid_scores, &allowed).map_err(|err| {
                warn!(particle = %particle.id, %shape, "pid scores vanish under shape mask");
                err.with_context("particle", particle.id)
                    .with_context("field", "pid_scores")
                    .with_context("shape", shape)
            })?;
            particle.set_pid_scores(scores);
        }
        if self.opts.enforce_primary && !particle.primary_scores.is_empty() {
            let allowed = self
                .tables
                .allowed_primary_indices(shape)
                .map_err(|err| err.with_context("particle", particle.id))?;
            let scores = mask_and_renormalize(&particle.primary_scores, allowed).map_err(|err| {
                warn!(particle = %particle.id, %shape, "primary scores vanish under shape mask");
                err.with_context("particle", particle.id)
                    .with_context("field", "primary_scores")
                    .with_context("shape", shape)
            })?;
            particle.set_primary_scores(scores);
        }
        Ok(())
    }
}

impl PostProcessor for ParticleSemanticsProcessor<'_> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn result_cap(&self) -> &'static [ResultKey] {
        &[ResultKey::Particles, ResultKey::Interactions]
    }

    fn process(&self, event: &mut Event) -> Result<ProcessOutcome, RecoError> {
        debug!(
            particles = event.particles.len(),
            enforce_pid = self.opts.enforce_pid,
            enforce_primary = self.opts.enforce_primary,
            "enforcing particle semantics"
        );
        for particle in &mut event.particles {
            self.enforce(particle)?;
        }
        event.update_interactions()?;
        Ok(ProcessOutcome::empty())
    }
}

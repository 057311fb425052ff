use indexmap::IndexMap;
use reco_core::errors::ErrorInfo;
use reco_core::{DomainTables, Event, Particle, Pid, RecoError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::processor::{PostProcessor, ProcessOutcome, ResultKey};

/// Ordered PID thresholds; iteration follows insertion order.
pub type PidThresholds = IndexMap<Pid, f64>;

/// Options of the threshold-based property adjustment stage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdOpts {
    /// Thresholds applied to every non-track particle, in priority order.
    #[serde(default)]
    pub em_pid_thresholds: PidThresholds,
    /// Thresholds applied to track particles, in priority order.
    #[serde(default)]
    pub track_pid_thresholds: PidThresholds,
    /// Primary score at or above which a particle is a primary.
    #[serde(default)]
    pub primary_threshold: Option<f64>,
}

fn config_error(code: &str, message: impl Into<String>) -> RecoError {
    RecoError::Config(ErrorInfo::new(code, message.into()))
}

/// Walks `thresholds` in order and returns the first class whose score
/// passes its threshold.
///
/// After each rejected class the remaining scores are rescaled by
/// `1 / (1 - score)`, so later thresholds act on probabilities conditional
/// on the earlier classes having been rejected.
pub fn assign_pid(scores: &[f64], thresholds: &PidThresholds) -> Result<Pid, RecoError> {
    let mut scores = scores.to_vec();
    for (pid, threshold) in thresholds {
        let score = *scores.get(pid.index()).ok_or_else(|| {
            RecoError::MissingData(
                ErrorInfo::new("score-out-of-range", "no score for thresholded class")
                    .with_context("pid", pid)
                    .with_context("num_scores", scores.len()),
            )
        })?;
        if score >= *threshold {
            return Ok(*pid);
        }
        let remaining = 1.0 - score;
        if remaining <= 0.0 {
            return Err(RecoError::Coverage(
                ErrorInfo::new(
                    "exhausted-mass",
                    "rejected class holds all the probability mass",
                )
                .with_context("pid", pid)
                .with_context("threshold", threshold),
            ));
        }
        for value in &mut scores {
            *value /= remaining;
        }
    }
    Err(RecoError::Coverage(
        ErrorInfo::new("uncovered-particle", "no PID threshold was met")
            .with_context("classes", thresholds.len())
            .with_hint("specify a PID threshold for all or no particle type, ending with a 0 catch-all"),
    ))
}

/// Reassigns PID and primary status from ordered, user supplied thresholds
/// instead of the raw argmax.
#[derive(Debug, Clone)]
pub struct ParticlePropertiesProcessor<'t> {
    tables: &'t DomainTables,
    opts: ThresholdOpts,
}

impl<'t> ParticlePropertiesProcessor<'t> {
    /// Stage name used in configuration files.
    pub const NAME: &'static str = "adjust_particle_properties";

    /// Creates the stage, rejecting configurations that would do nothing.
    pub fn new(tables: &'t DomainTables, opts: ThresholdOpts) -> Result<Self, RecoError> {
        if opts.em_pid_thresholds.is_empty()
            && opts.track_pid_thresholds.is_empty()
            && opts.primary_threshold.is_none()
        {
            return Err(RecoError::Config(
                ErrorInfo::new("nothing-to-adjust", "no thresholds configured").with_hint(
                    "specify one of `em_pid_thresholds`, `track_pid_thresholds` or `primary_threshold`",
                ),
            ));
        }
        for (pid, threshold) in opts
            .em_pid_thresholds
            .iter()
            .chain(opts.track_pid_thresholds.iter())
        {
            if !threshold.is_finite() {
                return Err(config_error(
                    "invalid-threshold",
                    format!("threshold for {pid} must be finite"),
                ));
            }
        }
        if let Some(threshold) = opts.primary_threshold {
            if !threshold.is_finite() {
                return Err(config_error(
                    "invalid-threshold",
                    "primary threshold must be finite",
                ));
            }
        }
        Ok(Self { tables, opts })
    }

    /// Options the stage was built with.
    pub fn opts(&self) -> &ThresholdOpts {
        &self.opts
    }

    fn thresholds_for(&self, particle: &Particle) -> &PidThresholds {
        if self.tables.is_track(particle.semantic_type) {
            &self.opts.track_pid_thresholds
        } else {
            &self.opts.em_pid_thresholds
        }
    }

    fn adjust(&self, particle: &mut Particle) -> Result<(), RecoError> {
        let thresholds = self.thresholds_for(particle);
        if !thresholds.is_empty() {
            let pid = assign_pid(&particle.pid_scores, thresholds).map_err(|err| {
                warn!(particle = %particle.id, "pid threshold walk failed");
                err.with_context("particle", particle.id)
                    .with_context("shape", particle.semantic_type)
            })?;
            particle.pid = pid.label();
        }

        if let Some(threshold) = self.opts.primary_threshold {
            let score = particle.primary_scores.get(1).copied().ok_or_else(|| {
                RecoError::MissingData(
                    ErrorInfo::new("missing-primary-score", "primary score vector is too short")
                        .with_context("particle", particle.id)
                        .with_context("field", "primary_scores")
                        .with_context("len", particle.primary_scores.len()),
                )
            })?;
            particle.is_primary = score >= threshold;
        }
        Ok(())
    }
}

impl PostProcessor for ParticlePropertiesProcessor<'_> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn result_cap(&self) -> &'static [ResultKey] {
        &[ResultKey::Particles, ResultKey::Interactions]
    }

    fn process(&self, event: &mut Event) -> Result<ProcessOutcome, RecoError> {
        debug!(particles = event.particles.len(), "adjusting particle properties");
        for particle in &mut event.particles {
            self.adjust(particle)?;
        }
        event.update_interactions()?;
        Ok(ProcessOutcome::empty())
    }
}

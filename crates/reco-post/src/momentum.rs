use std::fmt;
use std::str::FromStr;

use reco_core::errors::ErrorInfo;
use reco_core::{DomainTables, Event, Particle, RecoError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::numerics::{relativistic_momentum, scale};
use crate::processor::{PostProcessor, ProcessOutcome, ResultKey};

/// Kinetic energy source selection policy for track particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MomentumMethod {
    /// Range for contained tracks, scattering for exiting ones.
    #[default]
    Best,
    /// Range whenever it is available.
    Csda,
    /// Calorimetry only.
    Calo,
    /// Scattering whenever it is available.
    Mcs,
}

impl MomentumMethod {
    /// Returns the configuration name of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            MomentumMethod::Best => "best",
            MomentumMethod::Csda => "csda",
            MomentumMethod::Calo => "calo",
            MomentumMethod::Mcs => "mcs",
        }
    }
}

impl fmt::Display for MomentumMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MomentumMethod {
    type Err = RecoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best" => Ok(MomentumMethod::Best),
            "csda" => Ok(MomentumMethod::Csda),
            "calo" => Ok(MomentumMethod::Calo),
            "mcs" => Ok(MomentumMethod::Mcs),
            other => Err(RecoError::Config(
                ErrorInfo::new("unknown-method", "momentum reconstruction method not recognized")
                    .with_context("method", other)
                    .with_hint("use one of best, csda, calo, mcs"),
            )),
        }
    }
}

/// Estimator a kinetic energy value was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KineticEnergySource {
    /// Summed deposited energy.
    Calorimetry,
    /// Continuous-slowing-down range.
    Csda,
    /// Multiple Coulomb scattering.
    Mcs,
}

/// Options of the momentum reconstruction stage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MomentumOpts {
    /// Kinetic energy source selection policy.
    #[serde(default)]
    pub method: MomentumMethod,
}

/// Combines kinetic energy and direction estimates into a 3-momentum.
#[derive(Debug, Clone)]
pub struct MomentumProcessor<'t> {
    tables: &'t DomainTables,
    method: MomentumMethod,
}

impl<'t> MomentumProcessor<'t> {
    /// Stage name used in configuration files.
    pub const NAME: &'static str = "reconstruct_momentum";

    /// Creates the stage over the shared domain tables.
    pub fn new(tables: &'t DomainTables, opts: MomentumOpts) -> Self {
        Self {
            tables,
            method: opts.method,
        }
    }

    /// Creates the stage from a method name, failing on unknown names.
    pub fn from_method_name(tables: &'t DomainTables, method: &str) -> Result<Self, RecoError> {
        Ok(Self {
            tables,
            method: method.parse()?,
        })
    }

    /// Policy the stage was built with.
    pub fn method(&self) -> MomentumMethod {
        self.method
    }

    /// Picks the kinetic energy estimate for a particle.
    ///
    /// Non-track particles always use calorimetry. Tracks try range first
    /// when the policy is `csda` (or `best` and contained), then scattering
    /// when the policy is `mcs` (or `best` and exiting), and fall back to
    /// calorimetry. Non-positive estimates are skipped.
    pub fn select_kinetic_energy(&self, particle: &Particle) -> (KineticEnergySource, f64) {
        if !self.tables.is_track(particle.semantic_type) {
            return (KineticEnergySource::Calorimetry, particle.calo_ke);
        }
        let best = self.method == MomentumMethod::Best;
        let prefer_csda = self.method == MomentumMethod::Csda || (best && particle.is_contained);
        let prefer_mcs = self.method == MomentumMethod::Mcs || (best && !particle.is_contained);
        if prefer_csda && particle.csda_ke > 0.0 {
            (KineticEnergySource::Csda, particle.csda_ke)
        } else if prefer_mcs && particle.mcs_ke > 0.0 {
            (KineticEnergySource::Mcs, particle.mcs_ke)
        } else {
            (KineticEnergySource::Calorimetry, particle.calo_ke)
        }
    }

    fn reconstruct(&self, particle: &mut Particle) -> Result<(), RecoError> {
        if !particle.is_pid_determined() {
            debug!(particle = %particle.id, "skipping particle with undetermined pid");
            return Ok(());
        }
        let mass = self.tables.mass(particle.pid).ok_or_else(|| {
            RecoError::MissingData(
                ErrorInfo::new("unsupported-pid", "no rest mass for particle identity")
                    .with_context("particle", particle.id)
                    .with_context("pid", particle.pid),
            )
        })?;

        let (source, kinetic_energy) = self.select_kinetic_energy(particle);
        if !(kinetic_energy > 0.0) {
            warn!(particle = %particle.id, ?source, "no positive kinetic energy estimate");
            return Err(RecoError::MissingData(
                ErrorInfo::new("missing-kinetic-energy", "kinetic energy estimate is not positive")
                    .with_context("particle", particle.id)
                    .with_context("source", format!("{source:?}"))
                    .with_context("value", kinetic_energy)
                    .with_hint("fill the `*_ke` attributes before reconstructing momentum"),
            ));
        }

        let direction = particle.direction().ok_or_else(|| {
            RecoError::MissingData(
                ErrorInfo::new("missing-direction", "start direction is unavailable")
                    .with_context("particle", particle.id)
                    .with_context("field", "start_dir")
                    .with_hint("fill the `start_dir` attribute before reconstructing momentum"),
            )
        })?;

        let magnitude = relativistic_momentum(kinetic_energy, mass);
        debug!(particle = %particle.id, ?source, kinetic_energy, magnitude, "momentum reconstructed");
        particle.momentum = Some(scale(direction, magnitude));
        Ok(())
    }
}

impl PostProcessor for MomentumProcessor<'_> {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn result_cap(&self) -> &'static [ResultKey] {
        &[ResultKey::Particles]
    }

    fn process(&self, event: &mut Event) -> Result<ProcessOutcome, RecoError> {
        debug!(particles = event.particles.len(), method = %self.method, "reconstructing momentum");
        for particle in &mut event.particles {
            self.reconstruct(particle)?;
        }
        Ok(ProcessOutcome::empty())
    }
}

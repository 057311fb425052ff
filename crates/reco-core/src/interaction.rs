use serde::{Deserialize, Serialize};

use crate::domain::Pid;
use crate::errors::{ErrorInfo, RecoError};
use crate::ids::{InteractionId, ParticleId};
use crate::particle::Particle;

/// Cached particle-derived summary of an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct InteractionSummary {
    /// Number of constituent particles.
    pub num_particles: usize,
    /// Number of constituent primaries.
    pub num_primaries: usize,
    /// Particle count per PID class, in label order.
    pub particle_counts: [usize; Pid::COUNT],
    /// Primary count per PID class, in label order.
    pub primary_counts: [usize; Pid::COUNT],
    /// Particles whose PID is undetermined or unsupported.
    pub unknown_count: usize,
    /// Primary content such as `1mu1p`.
    pub topology: String,
}

/// Reconstructed interaction: a non-owning grouping of particles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// Identifier of the interaction within its event.
    pub id: InteractionId,
    /// Constituent particles, addressed through the event arena.
    pub particle_ids: Vec<ParticleId>,
    /// Summary derived from the current state of the constituents.
    #[serde(default)]
    pub summary: InteractionSummary,
}

impl Interaction {
    /// Creates an interaction with an empty summary.
    pub fn new(id: InteractionId, particle_ids: Vec<ParticleId>) -> Self {
        Self {
            id,
            particle_ids,
            summary: InteractionSummary::default(),
        }
    }

    /// Re-derives the cached summary from the particle arena.
    pub fn update_particle_info(&mut self, particles: &[Particle]) -> Result<(), RecoError> {
        let mut summary = InteractionSummary::default();
        for pid in &self.particle_ids {
            let particle = particles.get(pid.index()).ok_or_else(|| {
                RecoError::MissingData(
                    ErrorInfo::new("dangling-particle", "interaction references unknown particle")
                        .with_context("interaction", self.id)
                        .with_context("particle", pid),
                )
            })?;
            summary.num_particles += 1;
            if particle.is_primary {
                summary.num_primaries += 1;
            }
            match particle.pid_class() {
                Some(class) => {
                    summary.particle_counts[class.index()] += 1;
                    if particle.is_primary {
                        summary.primary_counts[class.index()] += 1;
                    }
                }
                None => summary.unknown_count += 1,
            }
        }
        summary.topology = topology(&summary.primary_counts);
        self.summary = summary;
        Ok(())
    }
}

fn topology(primary_counts: &[usize; Pid::COUNT]) -> String {
    Pid::ALL
        .iter()
        .zip(primary_counts.iter())
        .filter(|(_, count)| **count > 0)
        .map(|(pid, count)| format!("{count}{}", pid.tag()))
        .collect()
}

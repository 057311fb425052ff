use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ErrorInfo, RecoError};
use crate::interaction::Interaction;
use crate::particle::Particle;

/// Per-event result mapping handed to the post-processors.
///
/// Particles live in an arena addressed by [`ParticleId`](crate::ParticleId);
/// interactions only hold identifiers, so every mutation is seen through a
/// single record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Event {
    /// Particle arena.
    #[serde(default)]
    pub particles: Vec<Particle>,
    /// Interactions referencing the arena.
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    /// Every other key of the upstream result mapping, carried through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Event {
    /// Creates an event from its particles and interactions.
    pub fn new(particles: Vec<Particle>, interactions: Vec<Interaction>) -> Self {
        Self {
            particles,
            interactions,
            extra: BTreeMap::new(),
        }
    }

    /// Checks that particle ids match arena positions and that every
    /// interaction reference resolves.
    pub fn validate(&self) -> Result<(), RecoError> {
        for (idx, particle) in self.particles.iter().enumerate() {
            if particle.id.index() != idx {
                return Err(RecoError::MissingData(
                    ErrorInfo::new("misplaced-particle", "particle id does not match arena index")
                        .with_context("particle", particle.id)
                        .with_context("index", idx),
                ));
            }
        }
        for interaction in &self.interactions {
            for pid in &interaction.particle_ids {
                if pid.index() >= self.particles.len() {
                    return Err(RecoError::MissingData(
                        ErrorInfo::new(
                            "dangling-particle",
                            "interaction references unknown particle",
                        )
                        .with_context("interaction", interaction.id)
                        .with_context("particle", pid),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Recomputes the cached summary of every interaction.
    pub fn update_interactions(&mut self) -> Result<(), RecoError> {
        let particles = &self.particles;
        for interaction in &mut self.interactions {
            interaction.update_particle_info(particles)?;
        }
        Ok(())
    }

    /// Merges a keyed update into the pass-through mapping.
    pub fn merge_extra(&mut self, update: BTreeMap<String, Value>) {
        self.extra.extend(update);
    }
}

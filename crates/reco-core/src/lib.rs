#![deny(missing_docs)]
#![doc = "Core data model for reconstruction post-processing: particle and interaction records, the per-event arena, domain tables and the shared error taxonomy."]

/// Semantic shapes, particle identities and lookup tables.
pub mod domain;
pub mod errors;
/// Event arena and pass-through result mapping.
pub mod event;
mod ids;
/// Interaction records and their cached summaries.
pub mod interaction;
/// Particle records.
pub mod particle;
/// JSON and YAML helpers.
pub mod serde;

pub use domain::{DomainTables, Pid, Shape};
pub use errors::{ErrorInfo, RecoError};
pub use event::Event;
pub use ids::{InteractionId, ParticleId};
pub use interaction::{Interaction, InteractionSummary};
pub use particle::{argmax, Particle, UNAVAILABLE_KE, UNDETERMINED_PID};

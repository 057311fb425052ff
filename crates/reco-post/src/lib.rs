#![deny(missing_docs)]
#![doc = "Deterministic post-processing of reconstructed particles: semantic consistency, threshold-based PID/primary assignment and momentum reconstruction."]

/// YAML configuration of the post-processing chain.
pub mod config;
/// Kinetic energy source selection and momentum reconstruction.
pub mod momentum;
/// Score masking and kinematic helpers.
pub mod numerics;
/// Ordered stage execution.
pub mod pipeline;
/// The stage trait and its outcome type.
pub mod processor;
/// Semantic-consistency enforcement.
pub mod semantics;
/// Threshold-based PID and primary adjustment.
pub mod thresholds;

pub use config::PostProcessingConfig;
pub use momentum::{KineticEnergySource, MomentumMethod, MomentumOpts, MomentumProcessor};
pub use numerics::{mask_and_renormalize, relativistic_momentum};
pub use pipeline::Pipeline;
pub use processor::{PostProcessor, ProcessOutcome, ResultKey};
pub use semantics::{ParticleSemanticsProcessor, SemanticsOpts};
pub use thresholds::{assign_pid, ParticlePropertiesProcessor, PidThresholds, ThresholdOpts};

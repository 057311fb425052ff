use serde::{Deserialize, Serialize};

use crate::domain::{Pid, Shape};
use crate::ids::{InteractionId, ParticleId};

/// PID label meaning "no identity assigned".
pub const UNDETERMINED_PID: i32 = -1;

/// Kinetic energy value meaning "estimate unavailable".
pub const UNAVAILABLE_KE: f64 = -1.0;

fn default_pid() -> i32 {
    UNDETERMINED_PID
}

fn default_ke() -> f64 {
    UNAVAILABLE_KE
}

/// Index of the first maximum of `values`, ignoring NaN entries.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Reconstructed particle record produced by upstream inference and clustering.
///
/// Post-processors rewrite its fields in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Arena identifier (index within the event).
    pub id: ParticleId,
    /// Interaction the particle was clustered into, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_id: Option<InteractionId>,
    /// Semantic shape assigned by segmentation.
    pub semantic_type: Shape,
    /// Softmax scores, one per PID class.
    #[serde(default)]
    pub pid_scores: Vec<f64>,
    /// Softmax scores `[secondary, primary]`.
    #[serde(default)]
    pub primary_scores: Vec<f64>,
    /// Raw PID label; negative means undetermined.
    #[serde(default = "default_pid")]
    pub pid: i32,
    /// Whether the particle originates at the interaction vertex.
    #[serde(default)]
    pub is_primary: bool,
    /// Whether the trajectory stays inside the instrumented volume.
    #[serde(default)]
    pub is_contained: bool,
    /// Calorimetric kinetic energy (MeV); non-positive when unavailable.
    #[serde(default = "default_ke")]
    pub calo_ke: f64,
    /// Range-based (CSDA) kinetic energy (MeV); non-positive when unavailable.
    #[serde(default = "default_ke")]
    pub csda_ke: f64,
    /// Multiple-Coulomb-scattering kinetic energy (MeV); non-positive when unavailable.
    #[serde(default = "default_ke")]
    pub mcs_ke: f64,
    /// Unit start direction.
    #[serde(default)]
    pub start_dir: Option<[f64; 3]>,
    /// Reconstructed 3-momentum (MeV/c).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub momentum: Option<[f64; 3]>,
}

impl Particle {
    /// Creates a particle with no scores, no energy estimates and no direction.
    pub fn new(id: ParticleId, semantic_type: Shape) -> Self {
        Self {
            id,
            interaction_id: None,
            semantic_type,
            pid_scores: Vec::new(),
            primary_scores: Vec::new(),
            pid: UNDETERMINED_PID,
            is_primary: false,
            is_contained: false,
            calo_ke: UNAVAILABLE_KE,
            csda_ke: UNAVAILABLE_KE,
            mcs_ke: UNAVAILABLE_KE,
            start_dir: None,
            momentum: None,
        }
    }

    /// Replaces the PID scores and re-derives `pid` as their argmax.
    pub fn set_pid_scores(&mut self, scores: Vec<f64>) {
        if let Some(idx) = argmax(&scores) {
            self.pid = idx as i32;
        }
        self.pid_scores = scores;
    }

    /// Replaces the primary scores and re-derives `is_primary`.
    pub fn set_primary_scores(&mut self, scores: Vec<f64>) {
        if let Some(idx) = argmax(&scores) {
            self.is_primary = idx == 1;
        }
        self.primary_scores = scores;
    }

    /// Whether a PID label has been assigned.
    pub fn is_pid_determined(&self) -> bool {
        self.pid >= 0
    }

    /// The assigned identity, if it is one of the supported classes.
    pub fn pid_class(&self) -> Option<Pid> {
        Pid::from_label(self.pid)
    }

    /// The start direction, if upstream filled it.
    ///
    /// A leading `-inf` component is the upstream "unavailable" sentinel.
    pub fn direction(&self) -> Option<[f64; 3]> {
        self.start_dir
            .filter(|dir| dir[0] != f64::NEG_INFINITY && dir.iter().all(|c| c.is_finite()))
    }
}

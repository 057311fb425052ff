use std::collections::BTreeMap;

use reco_core::{Event, RecoError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keys of the per-event result mapping a processor reads and rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKey {
    /// `Event::particles`.
    Particles,
    /// `Event::interactions`.
    Interactions,
}

/// Keyed updates returned by a processor.
///
/// The reconstruction processors mutate the event in place, so both maps
/// stay empty and merging them is a no-op.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessOutcome {
    /// Updates to the input data mapping.
    pub data_update: BTreeMap<String, Value>,
    /// Updates to the result mapping.
    pub result_update: BTreeMap<String, Value>,
}

impl ProcessOutcome {
    /// Returns an outcome carrying no updates.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether both update maps are empty.
    pub fn is_empty(&self) -> bool {
        self.data_update.is_empty() && self.result_update.is_empty()
    }
}

/// A single post-processing stage operating on one event.
pub trait PostProcessor: Send + Sync {
    /// Stable stage name, also used as the configuration key.
    fn name(&self) -> &'static str;

    /// Result keys the stage depends on.
    fn result_cap(&self) -> &'static [ResultKey];

    /// Mutates the event in place.
    fn process(&self, event: &mut Event) -> Result<ProcessOutcome, RecoError>;
}

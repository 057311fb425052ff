use reco_core::errors::ErrorInfo;
use reco_core::RecoError;
use serde::{Deserialize, Deserializer, Serialize};

use crate::momentum::MomentumOpts;
use crate::semantics::SemanticsOpts;
use crate::thresholds::ThresholdOpts;

/// A section key without a body (`reconstruct_momentum:`) enables the stage
/// with default options; only an absent key disables it.
fn section<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(|opts| Some(opts.unwrap_or_default()))
}

/// YAML-configurable post-processing chain. A section that is absent
/// disables the corresponding stage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostProcessingConfig {
    /// Semantic-consistency enforcement.
    #[serde(
        default,
        deserialize_with = "section",
        skip_serializing_if = "Option::is_none"
    )]
    pub enforce_particle_semantics: Option<SemanticsOpts>,
    /// Threshold-based PID and primary adjustment.
    #[serde(
        default,
        deserialize_with = "section",
        skip_serializing_if = "Option::is_none"
    )]
    pub adjust_particle_properties: Option<ThresholdOpts>,
    /// Momentum reconstruction.
    #[serde(
        default,
        deserialize_with = "section",
        skip_serializing_if = "Option::is_none"
    )]
    pub reconstruct_momentum: Option<MomentumOpts>,
}

impl PostProcessingConfig {
    /// Parses a YAML document; malformed or unrecognised options are configuration errors.
    pub fn from_yaml_str(text: &str) -> Result<Self, RecoError> {
        serde_yaml::from_str(text).map_err(|err| {
            RecoError::Config(ErrorInfo::new("invalid-config", err.to_string()))
        })
    }

    /// Whether no stage is enabled.
    pub fn is_empty(&self) -> bool {
        self.enforce_particle_semantics.is_none()
            && self.adjust_particle_properties.is_none()
            && self.reconstruct_momentum.is_none()
    }
}

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{ErrorInfo, RecoError};
use crate::event::Event;

fn json_err(err: serde_json::Error, code: &str) -> RecoError {
    RecoError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn yaml_err(err: serde_yaml::Error, code: &str) -> RecoError {
    RecoError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Serialises a payload to pretty printed JSON bytes.
pub fn to_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, RecoError> {
    serde_json::to_vec_pretty(value).map_err(|err| json_err(err, "json-serialize"))
}

/// Restores a payload from JSON bytes.
pub fn from_json_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, RecoError> {
    serde_json::from_slice(bytes).map_err(|err| json_err(err, "json-deserialize"))
}

/// Restores a payload from a YAML document.
pub fn from_yaml_str<T: DeserializeOwned>(text: &str) -> Result<T, RecoError> {
    serde_yaml::from_str(text).map_err(|err| yaml_err(err, "yaml-deserialize"))
}

/// Serialises a payload to a YAML document.
pub fn to_yaml_string<T: Serialize>(value: &T) -> Result<String, RecoError> {
    serde_yaml::to_string(value).map_err(|err| yaml_err(err, "yaml-serialize"))
}

/// Decodes either a single event object or an array of events.
pub fn events_from_json_slice(bytes: &[u8]) -> Result<Vec<Event>, RecoError> {
    let value: serde_json::Value = from_json_slice(bytes)?;
    if value.is_array() {
        serde_json::from_value(value).map_err(|err| json_err(err, "events-deserialize"))
    } else {
        serde_json::from_value(value)
            .map(|event| vec![event])
            .map_err(|err| json_err(err, "event-deserialize"))
    }
}

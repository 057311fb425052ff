//! Structured error types shared across the reconstruction crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Diagnostic attached to every [`RecoError`].
///
/// `context` names the offending record (particle or interaction id, score
/// field, shape, pipeline stage) so a failure can be traced back to the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Kebab-case failure code, e.g. `zero-mass`.
    pub code: String,
    /// What went wrong.
    pub message: String,
    /// Record coordinates and offending values, sorted by key.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Upstream field or option to fix, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a diagnostic without context.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records a coordinate of the failure; a repeated key keeps the latest value.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Points at the field or option to fix.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Failure of a post-processing stage, grouped by what the caller has to fix.
///
/// None of these are recovered locally: a processor returning one aborts the
/// current event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum RecoError {
    /// Construction-time configuration errors.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Threshold walks that end without assigning a class.
    #[error("coverage error: {0}")]
    Coverage(ErrorInfo),
    /// Required upstream fields that were never populated.
    #[error("missing data: {0}")]
    MissingData(ErrorInfo),
    /// Score vectors that cannot be renormalized.
    #[error("normalization error: {0}")]
    Normalization(ErrorInfo),
    /// Shapes or classes absent from the domain tables.
    #[error("domain error: {0}")]
    Domain(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        let mut entries = self.context.iter();
        if let Some((key, value)) = entries.next() {
            write!(f, " at {key}={value}")?;
            for (key, value) in entries {
                write!(f, " {key}={value}")?;
            }
        }
        match &self.hint {
            Some(hint) => write!(f, "; hint: {hint}"),
            None => Ok(()),
        }
    }
}

impl RecoError {
    /// The diagnostic, whatever the family.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            RecoError::Config(info)
            | RecoError::Coverage(info)
            | RecoError::MissingData(info)
            | RecoError::Normalization(info)
            | RecoError::Domain(info)
            | RecoError::Serde(info) => info,
        }
    }

    /// Family label used in logs.
    pub fn family(&self) -> &'static str {
        match self {
            RecoError::Config(_) => "config",
            RecoError::Coverage(_) => "coverage",
            RecoError::MissingData(_) => "missing-data",
            RecoError::Normalization(_) => "normalization",
            RecoError::Domain(_) => "domain",
            RecoError::Serde(_) => "serde",
        }
    }

    /// Records a coordinate of the failure, keeping the family.
    pub fn with_context(self, key: impl Into<String>, value: impl ToString) -> Self {
        self.map_info(|info| info.with_context(key, value))
    }

    fn map_info(self, f: impl FnOnce(ErrorInfo) -> ErrorInfo) -> Self {
        match self {
            RecoError::Config(info) => RecoError::Config(f(info)),
            RecoError::Coverage(info) => RecoError::Coverage(f(info)),
            RecoError::MissingData(info) => RecoError::MissingData(f(info)),
            RecoError::Normalization(info) => RecoError::Normalization(f(info)),
            RecoError::Domain(info) => RecoError::Domain(f(info)),
            RecoError::Serde(info) => RecoError::Serde(f(info)),
        }
    }
}

use thiserror::Error;

/// Why a persisted snapshot was rejected outright.
///
/// Individual bad fields inside an otherwise well-formed snapshot are skipped
/// rather than reported here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("snapshot section `{section}` must be {expected}, found {found}")]
    InvalidSection {
        section: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("snapshot has none of the sections frequency_grid, performance_state, adaptation_state")]
    NoKnownSections,
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

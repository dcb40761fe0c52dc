//! Structured data serialization for ajax payloads.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during serialization.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serializes data to compact JSON, as sent on the wire.
pub fn to_json<T: Serialize>(data: &T) -> Result<String, SerializeError> {
    Ok(serde_json::to_string(data)?)
}

/// Converts data to a JSON value, for filters that operate on values.
pub fn to_value<T: Serialize>(data: &T) -> Result<serde_json::Value, SerializeError> {
    Ok(serde_json::to_value(data)?)
}

//! Response decoding
//!
//! The service does not keep one response schema across API versions, so list
//! bodies are decoded by trying each accepted shape in turn. Error bodies fall
//! back to the raw text when they are not one of the known error forms.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::error::{ApiError, MemoryError, Result};
use super::types::MemoryEntry;

/// `{"results": [...], "count": n}` wrapper used by paginated endpoints
#[derive(Debug, Deserialize)]
struct ListEnvelope {
    results: Vec<MemoryEntry>,
    #[serde(default)]
    count: Option<u64>,
}

/// Map a non-success response to the matching error.
pub(crate) fn error_from_body(status: StatusCode, body: &str) -> MemoryError {
    match serde_json::from_str::<ApiError>(body) {
        Ok(mut err) if err.is_structured() => {
            err.status = status.as_u16();
            MemoryError::Api(err)
        }
        _ => MemoryError::UnexpectedStatus {
            status: status.as_u16(),
            body: body.to_string(),
        },
    }
}

/// Decode a body that must match exactly one schema.
pub(crate) fn decode_one<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| MemoryError::Decode {
        reason: e.to_string(),
        body: body.to_string(),
    })
}

/// Decode a list body: envelope, then bare array, then a single object.
pub(crate) fn decode_entries(body: &str) -> Result<Vec<MemoryEntry>> {
    if let Ok(envelope) = serde_json::from_str::<ListEnvelope>(body) {
        return Ok(match envelope.count {
            Some(0) => Vec::new(),
            _ => envelope.results,
        });
    }

    if let Ok(entries) = serde_json::from_str::<Vec<MemoryEntry>>(body) {
        return Ok(entries);
    }

    serde_json::from_str::<MemoryEntry>(body)
        .map(|entry| vec![entry])
        .map_err(|e| MemoryError::Decode {
            reason: format!(
                "expected a results envelope, an array or a single memory ({})",
                e
            ),
            body: body.to_string(),
        })
}

//! Batch request items and per-item results.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::envelope::BatchEnvelope;
use crate::transport::TransportResponse;

/// Item message when the batch call failed at the network layer.
pub const NETWORK_ERROR: &str = "Network error";

/// Item message when the server answered the batch call with a non-2xx status.
pub const BATCH_REQUEST_FAILED: &str = "Batch request failed";

/// Item message when the batch response body could not be decoded.
pub const MALFORMED_BATCH_RESPONSE: &str = "Malformed batch response";

/// Item message when a failed item carried no error message.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// One entry of a batch request: an entity, or a section of one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchItem {
    #[serde(rename = "type")]
    pub asset_type: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl BatchItem {
    /// Item requesting a whole entity.
    pub fn entity(asset_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            asset_type: asset_type.into(),
            id: id.into(),
            section: None,
        }
    }

    /// Item requesting one section of an entity.
    pub fn section(
        asset_type: impl Into<String>,
        id: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        Self {
            asset_type: asset_type.into(),
            id: id.into(),
            section: Some(section.into()),
        }
    }
}

/// Outcome of one batch item.
///
/// Serializes as `{ok: true, data}` or `{ok: false, error}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BatchResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchResult {
    pub fn success(data: Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// `count` identical failures, used when the whole call failed.
    pub(crate) fn failed_all(count: usize, message: &str) -> Vec<Self> {
        vec![Self::failure(message); count]
    }
}

/// Reasons a 2xx batch response cannot be mapped onto the request items.
#[derive(Debug, Error)]
pub(crate) enum BatchDecodeError {
    #[error("invalid batch body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected {expected} batch results, got {found}")]
    Count { expected: usize, found: usize },
}

/// Map a batch response onto `count` results in request order.
///
/// A non-2xx status fails every item. A 2xx body must carry a `results`
/// array with exactly one slot per item; anything else is an error.
pub(crate) fn results_from_response(
    count: usize,
    response: &TransportResponse,
) -> Result<Vec<BatchResult>, BatchDecodeError> {
    if !response.is_success() {
        return Ok(BatchResult::failed_all(count, BATCH_REQUEST_FAILED));
    }

    let body: BatchEnvelope = response.json()?;
    if body.results.len() != count {
        return Err(BatchDecodeError::Count {
            expected: count,
            found: body.results.len(),
        });
    }

    let results = body
        .results
        .into_iter()
        .map(|slot| {
            let envelope = slot.result;
            if envelope.ok {
                BatchResult::success(envelope.data)
            } else {
                BatchResult::failure(envelope.error_message().unwrap_or(UNKNOWN_ERROR))
            }
        })
        .collect();

    Ok(results)
}

//! Response envelopes of the remote asset API.
//!
//! Single-asset endpoints answer `{ok: true, data}` or
//! `{ok: false, error: {code, message}}`. The batch endpoint wraps one such
//! envelope per item under `results[i].result`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error object carried by a failed envelope.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `{ok, data?, error?}` wrapper.
///
/// A missing `ok` field makes the body malformed; a missing `data` field on
/// a successful envelope decodes as `null`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct Envelope {
    pub ok: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub error: Option<ApiError>,
}

impl Envelope {
    /// Payload of a successful envelope.
    pub fn into_data(self) -> Option<Value> {
        self.ok.then_some(self.data)
    }

    /// Message of a failed envelope, if the server supplied one.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().and_then(|e| e.message.as_deref())
    }
}

/// One slot of a batch response.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct BatchSlot {
    pub result: Envelope,
}

/// Body of a batch response.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct BatchEnvelope {
    pub results: Vec<BatchSlot>,
}

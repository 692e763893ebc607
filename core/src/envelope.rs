//! The `{status, message, data}` wrapper every backend response uses.

use serde::{Deserialize, Serialize};

/// Envelope status that signals success.
pub const SUCCESS_STATUS: i64 = 200;

/// A decoded response envelope.
///
/// The mini-program backend names the status field `code`; both spellings
/// are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T> {
    #[serde(alias = "code")]
    pub status: i64,
    #[serde(default)]
    pub message: String,
    pub data: T,
}

impl<T> ResponseEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }
}

/// Wire form before the status has been checked. Error envelopes carry `{}`
/// or `null` as data, so the payload stays untyped until the status is known.
#[derive(Debug, Deserialize)]
pub(crate) struct RawEnvelope {
    #[serde(alias = "code")]
    pub status: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

//! Messages exchanged between a search client and the worker.
//!
//! Requests and responses share one envelope shape: `{ type, id, payload }`.
//! A response echoes the `type` and `id` of the request it answers.

use std::sync::Arc;

use docsearch_index::DecodedPage;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Result, WorkerError};

pub const LOAD_INDEX: &str = "load-index";
pub const QUERY_INDEX: &str = "query-index";

pub const INVALID_MESSAGE_TYPE: &str = "invalid message type";

/// A protocol message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,

    pub id: u64,

    #[serde(default)]
    pub payload: Value,
}

impl Envelope {
    pub fn new(kind: impl Into<String>, id: u64, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            id,
            payload,
        }
    }

    /// Build the response to this message.
    pub fn reply(&self, payload: Value) -> Self {
        Self {
            kind: self.kind.clone(),
            id: self.id,
            payload,
        }
    }

    /// The in-band error message, if this payload reports one.
    pub fn error(&self) -> Option<&str> {
        self.payload.get("error").and_then(Value::as_str)
    }
}

/// A decoded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    LoadIndex,
    QueryIndex(String),
    Unknown(String),
}

impl Request {
    /// Interpret an envelope. Unrecognised types are not an error; they map to
    /// [`Request::Unknown`] and are answered in-band.
    pub fn parse(envelope: &Envelope) -> Result<Self> {
        match envelope.kind.as_str() {
            LOAD_INDEX => Ok(Request::LoadIndex),
            QUERY_INDEX => match &envelope.payload {
                Value::String(text) => Ok(Request::QueryIndex(text.clone())),
                other => Err(WorkerError::Payload {
                    kind: QUERY_INDEX.to_string(),
                    message: format!("expected query text, found {other}"),
                }),
            },
            other => Ok(Request::Unknown(other.to_string())),
        }
    }
}

/// Payload of an in-band error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}

impl ErrorPayload {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    pub fn invalid_message_type() -> Self {
        Self::new(INVALID_MESSAGE_TYPE)
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({ "error": self.error })
    }
}

/// Payload of a `query-index` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub query: String,
    pub results: Vec<Arc<DecodedPage>>,
}

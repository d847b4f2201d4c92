//! Client errors
//!
//! Every failure of a remote call is classified into one of the `ClientError` variants.
//! Non-2xx responses are turned into `ClientError::Remote` without ever surfacing a
//! secondary parse error: the backend may answer with an HTML error page, so the body
//! is only inspected on a best-effort basis.

use reqwest::StatusCode;
use serde_json::Value;

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The backend could not be reached, or the response body could not be read
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status
    #[error("{message}")]
    Remote { status: StatusCode, message: String },

    /// The backend answered 2xx with a body that breaks the contract
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Received empty audio response from server")]
    EmptyPayload,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Status code of a remote failure
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Remote { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// True for 2xx responses that violated the expected contract
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ClientError::MalformedResponse(_) | ClientError::EmptyPayload
        )
    }
}

/// The remote operations, used to pick error fallback messages and log fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CloneVoice,
    InitiateFaceswap,
    FaceswapStatus,
    NarratorSpeech,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::CloneVoice => "clone_voice",
            Operation::InitiateFaceswap => "initiate_faceswap",
            Operation::FaceswapStatus => "faceswap_status",
            Operation::NarratorSpeech => "narrator_speech",
        }
    }

    /// Message used when the error body is not JSON at all
    fn unparseable_body_message(self, status: StatusCode) -> String {
        match self {
            Operation::CloneVoice | Operation::InitiateFaceswap => generic_message(status),
            Operation::FaceswapStatus => {
                "Failed to parse error from faceswap status check".to_string()
            }
            Operation::NarratorSpeech => {
                "Failed to parse error from narrator speech generation".to_string()
            }
        }
    }

    /// Message used when the error body is JSON without a usable `detail`
    fn missing_detail_message(self, status: StatusCode) -> String {
        match self {
            Operation::CloneVoice | Operation::InitiateFaceswap => generic_message(status),
            Operation::FaceswapStatus => "Failed to get faceswap video status".to_string(),
            Operation::NarratorSpeech => "Failed to generate narrator speech".to_string(),
        }
    }
}

fn generic_message(status: StatusCode) -> String {
    format!("API error: {}", status.as_u16())
}

/// Extracts a human-readable message from the `detail` field of an error body.
///
/// A string is used verbatim; any other non-null value (e.g. a list of validation
/// errors) is rendered as compact JSON. `null` and `""` count as absent.
fn detail_message(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::Null => None,
        Value::String(detail) if detail.is_empty() => None,
        Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}

/// Resolves the message of a non-2xx response from its raw body
pub(crate) fn remote_error_message(operation: Operation, status: StatusCode, body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => {
            detail_message(&value).unwrap_or_else(|| operation.missing_detail_message(status))
        }
        Err(_) => operation.unparseable_body_message(status),
    }
}

/// Builds the error for a non-2xx response
pub(crate) fn remote_error(operation: Operation, status: StatusCode, body: &[u8]) -> ClientError {
    ClientError::Remote {
        status,
        message: remote_error_message(operation, status, body),
    }
}

//! Error taxonomy shared by the stores and the transport layer.

use crate::store::event::Operation;
use serde_json::Value;
use thiserror::Error;

/// Failure of a store operation.
///
/// Server and network failures are captured into `StoreState::error_message`.
/// `InvalidInput` and `Superseded` are only ever returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("request rejected ({status}): {message}")]
    ValidationRejected { status: u16, message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{operation} was superseded by a newer request")]
    Superseded { operation: Operation },
}

impl StoreError {
    /// Classify a non-2xx response. `body` is the raw response text.
    pub fn from_status(status: u16, reason: &str, body: &str) -> Self {
        let message = problem_message(body).unwrap_or_else(|| {
            if reason.is_empty() {
                format!("HTTP {}", status)
            } else {
                reason.to_string()
            }
        });
        match status {
            404 => StoreError::NotFound { message },
            400..=499 => StoreError::ValidationRejected { status, message },
            _ => StoreError::ServerError { status, message },
        }
    }

    /// True for failures that are stored in state rather than returned eagerly.
    pub fn is_captured(&self) -> bool {
        !matches!(
            self,
            StoreError::InvalidInput(_) | StoreError::Superseded { .. }
        )
    }
}

/// Pull a human-readable message out of a problem+json body, falling back to
/// the raw text.
fn problem_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "title", "message"] {
            if let Some(Value::String(text)) = map.get(key) {
                if !text.is_empty() {
                    return Some(text.clone());
                }
            }
        }
    }
    Some(body.to_string())
}

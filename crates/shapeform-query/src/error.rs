//! Error types
//!
//! Every failed call is normalised into one [`ApiError`], whatever layer it
//! came from.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Errors raised by a [`Transport`](crate::Transport) before a response exists.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Header name or value rejected by the HTTP layer
    #[error("Invalid header `{0}`")]
    InvalidHeader(String),

    /// Any other transport failure
    #[error("{0}")]
    Other(String),
}

/// Normalised API failure.
///
/// `tag` mirrors the `_tag` field servers put on error payloads. When the
/// payload carries none, it is derived from the status code or the failing
/// layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{tag}: {message}")]
pub struct ApiError {
    pub tag: String,
    pub status: Option<u16>,
    pub message: String,
    /// Field path (dot form) to message, first issue per path
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub validation_errors: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl ApiError {
    pub fn new(tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            status: None,
            message: message.into(),
            validation_errors: IndexMap::new(),
            payload: None,
        }
    }

    /// Build from a non-2xx response.
    pub fn from_response(status: u16, payload: Option<Value>) -> Self {
        let body = payload.as_ref().and_then(Value::as_object);
        let tag = body
            .and_then(|b| b.get("_tag"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| status_tag(status).to_string());
        let message = body
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| payload.as_ref().and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| format!("Request failed with status {status}"));
        let validation_errors = body
            .and_then(|b| b.get("issues"))
            .map(issues_to_errors)
            .unwrap_or_default();

        Self {
            tag,
            status: Some(status),
            message,
            validation_errors,
            payload,
        }
    }

    pub fn from_transport(error: &TransportError) -> Self {
        Self::new("TransportError", error.to_string())
    }

    pub fn unknown_route(section: &str, method: &str) -> Self {
        Self::new("UnknownRoute", format!("No route for {section}.{method}"))
    }

    pub fn missing_path_param(name: &str) -> Self {
        Self::new("MissingPathParam", format!("Missing path parameter `{name}`"))
    }

    pub fn encode(error: &serde_json::Error) -> Self {
        Self::new("EncodeError", error.to_string())
    }

    pub fn decode(error: &serde_json::Error) -> Self {
        Self::new("DecodeError", error.to_string())
    }

    pub fn is_validation_error(&self) -> bool {
        !self.validation_errors.is_empty()
    }
}

fn status_tag(status: u16) -> &'static str {
    match status {
        400 => "BadRequest",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "NotFound",
        409 => "Conflict",
        422 => "ValidationError",
        500..=599 => "InternalServerError",
        _ => "HttpError",
    }
}

/// `[{ "path": ["a", 0, "b"], "message": "..." }]` into `{"a.0.b": "..."}`.
fn issues_to_errors(issues: &Value) -> IndexMap<String, String> {
    let mut errors = IndexMap::new();
    for issue in issues.as_array().into_iter().flatten() {
        let Some(message) = issue.get("message").and_then(Value::as_str) else {
            continue;
        };
        let path = match issue.get("path") {
            Some(Value::Array(segments)) => segments
                .iter()
                .map(|s| match s {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("."),
            Some(Value::String(path)) => path.clone(),
            _ => String::new(),
        };
        errors.entry(path).or_insert_with(|| message.to_string());
    }
    errors
}

//! Error types for the outbound HTTP stack

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Flat failure taxonomy reported upward and to diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Host unreachable when the error happened
    NetworkDown,
    /// Aborted through the abort registry
    Cancelled,
    /// HTTP 401
    Unauthorized,
    /// Retryable HTTP class (404, 408, 429, 502-504)
    NotFoundOrTransient,
    /// Everything else
    GenericApiError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::NetworkDown => "NETWORK_DOWN",
            ErrorKind::Cancelled => "CANCELLED",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::NotFoundOrTransient => "NOT_FOUND_OR_TRANSIENT",
            ErrorKind::GenericApiError => "GENERIC_API_ERROR",
        };
        write!(f, "{}", name)
    }
}

/// Storefront API error types
///
/// Server error bodies are passed through in `body` whenever the server sent one.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request cancelled")]
    Cancelled,

    #[error("Network unavailable: {0}")]
    NetworkDown(String),

    #[error("Unauthorized (401)")]
    Unauthorized { body: Option<Value> },

    #[error("Not found or temporarily unavailable ({status})")]
    NotFoundOrTransient { status: u16, body: Option<Value> },

    #[error("API error ({status})")]
    Api { status: u16, body: Option<Value> },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Cancelled => ErrorKind::Cancelled,
            ApiError::NetworkDown(_) => ErrorKind::NetworkDown,
            ApiError::Unauthorized { .. } => ErrorKind::Unauthorized,
            ApiError::NotFoundOrTransient { .. } => ErrorKind::NotFoundOrTransient,
            ApiError::Api { .. }
            | ApiError::Transport(_)
            | ApiError::InvalidUrl(_)
            | ApiError::InvalidResponse(_) => ErrorKind::GenericApiError,
        }
    }

    /// HTTP status, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::NotFoundOrTransient { status, .. } | ApiError::Api { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Server-sent error body, if any
    pub fn body(&self) -> Option<&Value> {
        match self {
            ApiError::Unauthorized { body }
            | ApiError::NotFoundOrTransient { body, .. }
            | ApiError::Api { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            ApiError::NetworkDown(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

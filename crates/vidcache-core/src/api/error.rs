use std::fmt;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API base URL is not configured")]
    NotConfigured,

    #[error("Request rejected ({status}): {body}")]
    Rejected {
        status: u16,
        message: Option<String>,
        body: String,
    },

    #[error("Resource not found: {body}")]
    NotFound { message: Option<String>, body: String },

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error ({status}): {body}")]
    ServerError {
        status: u16,
        message: Option<String>,
        body: String,
    },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error payload shapes servers commonly return
#[derive(Deserialize)]
struct ErrorPayload {
    message: Option<String>,
    error: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Pull a human-readable message out of a JSON error body, if the server sent one
    fn extract_message(body: &str) -> Option<String> {
        let payload: ErrorPayload = serde_json::from_str(body).ok()?;
        payload
            .message
            .or(payload.error)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::extract_message(body);
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            404 => ApiError::NotFound {
                message,
                body: truncated,
            },
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError {
                status: status.as_u16(),
                message,
                body: truncated,
            },
            code => ApiError::Rejected {
                status: code,
                message,
                body: truncated,
            },
        }
    }

    /// Message supplied by the server in its error body
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. }
            | ApiError::NotFound { message, .. }
            | ApiError::ServerError { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Message shown to the user: the server's own wording when it gave one,
    /// otherwise the fixed phrase for the failed operation.
    pub fn user_message(&self, operation: Operation) -> String {
        self.server_message()
            .map(str::to_string)
            .unwrap_or_else(|| operation.failure_message().to_string())
    }
}

/// The four remote operations; each has its own failure phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::Fetch => "Failed to fetch videos",
            Operation::Create => "Failed to add video",
            Operation::Update => "Failed to update video",
            Operation::Delete => "Failed to delete video",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Fetch => "fetch",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

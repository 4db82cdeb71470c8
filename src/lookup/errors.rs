//! Error types for the theatre lookup client

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Request failed with status {status}: {message}")]
    StatusError {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Request timed out after {0:?}")]
    TimeoutError(Duration),
}

impl LookupError {
    /// Short, single-line description suitable for a status line
    pub fn summary(&self) -> String {
        match self {
            LookupError::HttpError(_) => "network error".to_string(),
            LookupError::StatusError { status, message } => {
                format!("{} ({})", message, status.as_u16())
            }
            LookupError::JsonError(_) => "malformed response".to_string(),
            LookupError::TimeoutError(_) => "request timed out".to_string(),
        }
    }
}

pub type LookupResult<T> = Result<T, LookupError>;

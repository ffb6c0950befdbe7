use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreasuryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Upstream {url} timed out after {}ms", after.as_millis())]
    Timeout { url: String, after: Duration },
    #[error("Upstream {url} rate limited the request")]
    RateLimited { url: String },
    #[error("Upstream {url} returned {status}")]
    Status { url: String, status: StatusCode },
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Config(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl TreasuryError {
    /// Transport failures, timeouts and 429s may succeed on a later attempt.
    /// Any other upstream status is final.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TreasuryError::Http(_) | TreasuryError::Timeout { .. } | TreasuryError::RateLimited { .. }
        )
    }

    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            TreasuryError::Status { status, .. } => Some(*status),
            TreasuryError::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            _ => None,
        }
    }
}

impl From<sled::Error> for TreasuryError {
    fn from(err: sled::Error) -> Self {
        TreasuryError::Storage(err.to_string())
    }
}

pub type TreasuryResult<T> = Result<T, TreasuryError>;

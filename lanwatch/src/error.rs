//! Error taxonomy for polling and mutations.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Transport failure or non-success HTTP status.
    #[error("network error: {0}")]
    Network(String),
    /// Response body did not decode.
    #[error("parse error: {0}")]
    Parse(String),
    /// The backend rejected a block/unblock, or it never reached it.
    #[error("mutation failed: {0}")]
    Mutation(String),
}

impl SyncError {
    pub fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SyncError::Parse(e.to_string())
        } else {
            SyncError::Network(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

//! Custom error types for the preprocessing pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Stage faults
//! are surfaced to the chain's failure handler, which records a bounded
//! human-readable message on the dataset record.

use crate::record::RecordId;
use thiserror::Error;

/// Default upper bound for messages written to a record's `error_message`.
pub const DEFAULT_ERROR_MESSAGE_LIMIT: usize = 500;

/// The main error type for the preprocessing pipeline.
#[derive(Error, Debug)]
pub enum PrepError {
    /// Malformed inter-stage frame payload. Fatal to the chain, never
    /// retried silently.
    #[error("malformed frame payload: {0}")]
    Decode(String),

    /// A frame could not be encoded for inter-stage transport.
    #[error("failed to encode frame: {0}")]
    Encode(String),

    /// Expected target/ignored column absent from the frame.
    #[error("column '{0}' not found in frame")]
    Schema(String),

    /// Catch-all fault raised inside a stage; halts the chain.
    #[error("stage '{stage}' failed: {reason}")]
    Stage { stage: String, reason: String },

    /// Dataset record was not found in the store.
    #[error("dataset record {0} not found")]
    RecordNotFound(RecordId),

    /// A chain for this dataset id is already running.
    #[error("a preprocessing chain for dataset {0} is already active")]
    ChainActive(RecordId),

    /// Internal error (e.g., task join failure).
    #[error("internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PrepError {
    /// Wrap an arbitrary error as a fault of the named stage.
    pub fn stage_fault(stage: impl Into<String>, reason: impl ToString) -> Self {
        PrepError::Stage {
            stage: stage.into(),
            reason: reason.to_string(),
        }
    }

    /// Render the error as a message bounded to `limit` characters, suitable
    /// for persisting on the dataset record.
    pub fn truncated_message(&self, limit: usize) -> String {
        truncate_message(&self.to_string(), limit)
    }
}

/// Truncate a message to at most `limit` characters on a char boundary.
pub fn truncate_message(message: &str, limit: usize) -> String {
    if message.chars().count() <= limit {
        message.to_string()
    } else if limit < 3 {
        // No room for an ellipsis within the bound.
        message.chars().take(limit).collect()
    } else {
        let truncated: String = message.chars().take(limit - 3).collect();
        format!("{truncated}...")
    }
}

/// Result type alias for preprocessing operations.
pub type Result<T> = std::result::Result<T, PrepError>;

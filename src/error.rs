//! Error types for Synheart Seed

use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur during a generation, seeding, or read invocation.
///
/// Nothing here is fatal to the host process; every error is scoped to a
/// single invocation. Validation errors surface before any generation or
/// store work begins; store errors surface once the failing chunk is known.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Configuration rejected before generation starts (non-positive
    /// durations, zero chunk size, inverted bounds).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Caller-supplied request field failed validation.
    #[error("Invalid request field '{field}': {reason}")]
    MalformedRequest { field: String, reason: String },

    /// The external store rejected an insert or read. Carries the number of
    /// records already committed by prior chunks; partial application is
    /// expected and is never rolled back or retried here.
    #[error("Store failure after {committed} records committed: {source}")]
    StoreFailure {
        committed: usize,
        #[source]
        source: StoreError,
    },

    /// A store interaction outside the insert path (permission query or
    /// read) failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A generation or live-seeding run is already pending; one run at a time.
    #[error("A seeding run is already in progress")]
    RunInProgress,

    /// A spawned pipeline task failed to join.
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl SeedError {
    /// Convenience constructor for per-field request rejections
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SeedError::MalformedRequest {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

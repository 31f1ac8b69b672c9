//! Domain-level error taxonomy for the assessment engine.

use scl90_store::StorageError;

/// Assessment domain errors.
///
/// Every variant is recoverable and reported to the immediate caller.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error("redemption code must be exactly 8 digits")]
    MalformedCode,

    /// Covers both "never issued" and "already redeemed".
    #[error("redemption code is invalid or has already been used")]
    UnknownOrUsedCode,

    #[error("{missing} item(s) still unanswered; first unanswered at position {first_unanswered}")]
    IncompleteSubmission {
        missing: usize,
        first_unanswered: usize,
    },

    #[error("answer value {value} is outside the 1-5 scale")]
    InvalidAnswerValue { value: i64 },

    #[error("administrator authentication failed")]
    AdminAuthFailure,

    #[error("no redemption code has been redeemed in this session")]
    NotRedeemed,

    #[error("administrator login required")]
    AdminRequired,

    #[error("item {0} is not part of the catalog")]
    UnknownItem(u32),

    #[error("item {item_id} must be answered before moving on")]
    CurrentItemUnanswered { item_id: u32 },

    #[error("session already submitted")]
    SessionCompleted,

    #[error("could not generate an unused code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: usize },

    #[error("seed code {0:?} is not 8 digits")]
    InvalidSeedCode(String),

    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for assessment domain operations.
pub type Result<T> = std::result::Result<T, AssessmentError>;

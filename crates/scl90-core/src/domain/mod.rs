//! Domain models for the assessment engine.
//!
//! Canonical definitions for the core entities:
//! - `RedemptionCode`: single-use access token and its redemption state
//! - `AnswerSet` / `Score`: per-item answers of one session
//! - `AssessmentError`: the error taxonomy shared by every component

pub mod answers;
pub mod code;
pub mod error;

// Re-export main types and errors
pub use answers::{AnswerSet, Score, MAX_SCORE, MIN_SCORE};
pub use code::{is_well_formed, CodeSummary, RedemptionCode, CODE_LENGTH};
pub use error::{AssessmentError, Result};

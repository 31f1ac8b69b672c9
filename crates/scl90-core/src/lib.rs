//! SCL-90 Core Library
//!
//! Redemption-code gated questionnaire engine: code registry, session
//! state machine, scoring and interpretation over a pluggable key-value
//! store.

pub mod auth;
pub mod catalog;
pub mod code_registry;
pub mod config;
pub mod domain;
pub mod interpretation;
pub mod obs;
pub mod scoring;
pub mod session;
pub mod telemetry;

pub use auth::{admin_login, issue_code, list_codes, redeem_code, AuthContext};
pub use catalog::{AssessmentItem, Catalog, Dimension, LevelTexts};
pub use code_registry::{generate_code, generate_code_with, CodeRegistry};
pub use config::{BootstrapConfig, DEFAULT_ADMIN_PASSWORD, DEFAULT_SEED_CODES};
pub use domain::{
    is_well_formed, AnswerSet, AssessmentError, CodeSummary, RedemptionCode, Result, Score,
    CODE_LENGTH, MAX_SCORE, MIN_SCORE,
};
pub use interpretation::{
    interpret, level_reading, DimensionReading, Highlight, Interpretation, NormBand,
    OverallStatus, Severity,
};
pub use scoring::{reconcile_total, score, ScoreReport, POSITIVE_ITEM_THRESHOLD};
pub use session::{AssessmentSession, SessionState, SessionView};

pub use scl90_store::{FsKvStore, KvStore, MemoryKvStore, StoreConfig};

/// Version of the scl90-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

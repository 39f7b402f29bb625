//! Error taxonomy for the scheduling core.
//!
//! Not-found on remove is a silent no-op and never reaches this type; rating
//! an unknown slug creates the card instead of erroring. What remains is
//! validation (rejected before any write), storage failures (propagated
//! unmodified, no retries here), and corrupt persisted records.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage collaborator failed; message is passed through untouched.
    #[error("storage failure on record '{record}': {message}")]
    Storage { record: String, message: String },

    /// A persisted record exists but no longer parses.
    #[error("corrupt record '{record}': {source}")]
    Corrupt {
        record: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Setting rejected before any write; prior state is untouched.
    #[error("setting '{name}' rejected: {value} is outside {min}..={max}")]
    SettingOutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("card '{slug}' not found")]
    CardNotFound { slug: String },
}

pub type CoreResult<T> = Result<T, CoreError>;

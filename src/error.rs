//! Error types for Synheart Reps

use thiserror::Error;

/// Errors that can occur while counting repetitions
#[derive(Debug, Error)]
pub enum RepError {
    #[error("Failed to parse pose frame: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A joint a detector needs was withheld by the confidence filter.
    #[error("Missing required joint: {0}")]
    MissingJoint(&'static str),

    #[error("Non-finite input for {0}")]
    NonFiniteInput(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown session: {0}")]
    UnknownSession(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}

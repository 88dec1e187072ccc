//! Error types for the scheduling engine.

use thiserror::Error;

use crate::types::CardId;

/// Result type alias for per-answer operations.
pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Malformed deck configuration. Fatal at construction, never per-card.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("expected {expected} memory model parameters, got {got}")]
    WrongParamCount { expected: usize, got: usize },

    #[error("memory model parameter {index} must be finite and positive, got {value}")]
    InvalidParam { index: usize, value: f64 },

    #[error("desired retention must lie strictly between 0 and 1, got {0}")]
    RetentionOutOfRange(f64),
}

/// Errors that can occur while answering a card. A failed answer leaves the
/// input card untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("rating must be between 1 and 4, got {0}")]
    InvalidRating(u8),

    #[error("card {0} is in the review state but has no memory state")]
    MissingMemoryState(CardId),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

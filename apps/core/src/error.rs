use std::io;
use std::time::Duration;
use thiserror::Error;

/// Application-wide error type, consolidating all possible errors into a single enum.
#[derive(Debug, Error)]
pub enum AppError {
    /// A score is missing, non-numeric or otherwise unusable. Raised before any corpus mutation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Training was attempted on a corpus with no samples.
    #[error("Cannot train a classifier on an empty corpus")]
    EmptyCorpus,

    /// Training was attempted with fewer than two distinct labels.
    #[error("Training requires at least 2 distinct labels, found {found}")]
    InsufficientLabelDiversity { found: usize },

    /// A label key outside the fitted label space was decoded.
    #[error("Unknown label key: {0}")]
    UnknownLabel(u32),

    /// Background retraining did not finish within its budget. The previous model stays live.
    #[error("Training did not finish within {0:?}")]
    TrainingTimeout(Duration),

    /// Represents errors originating from the corpus database, typically from `sqlx`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Represents errors specific to the actor system, such as communication failures.
    #[error("Actor error: {0}")]
    Actor(String),

    /// Represents configuration-related errors (e.g., out-of-range environment values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents unexpected internal errors that indicate a bug.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation errors: {}", err))
    }
}

impl From<std::num::ParseFloatError> for AppError {
    fn from(err: std::num::ParseFloatError) -> Self {
        AppError::InvalidInput(format!("Not a number: {}", err))
    }
}

//! Error types for the levelup_core library.

use crate::Phase;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for levelup_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration file validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Workout plan (or timer cycle) cannot be used to start a session
    #[error("Invalid workout configuration: {0}")]
    Configuration(String),

    /// An action was invoked in a phase that does not support it
    #[error("Action '{action}' is not allowed during the {phase} phase")]
    InvalidAction { action: &'static str, phase: Phase },

    /// Reading from or writing to the progress store failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Reclassify a store failure as a persistence error
    pub fn into_persistence(self) -> Self {
        match self {
            Error::Persistence(_) => self,
            other => Error::Persistence(other.to_string()),
        }
    }
}

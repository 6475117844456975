//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::store::matcher::ParseMatchStrategyError;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable was not set.
    #[error("missing required environment variable: {name}")]
    MissingEnvVar { name: &'static str },

    /// A numeric environment variable could not be parsed.
    #[error("failed to parse {name}='{value}' as a number")]
    InvalidNumber { name: &'static str, value: String },

    /// A threshold fell outside [0, 1].
    #[error("{name}={value} is out of range: thresholds must be within [0, 1]")]
    ThresholdOutOfRange { name: &'static str, value: f64 },

    /// The match-strategy string was not recognized.
    #[error(transparent)]
    InvalidMatchStrategy(#[from] ParseMatchStrategyError),

    /// Specified path does not exist on the filesystem.
    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    /// Path exists but is not a file (when a file was expected).
    #[error("path is not a file: {path}")]
    NotAFile { path: PathBuf },
}

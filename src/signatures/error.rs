use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned while loading the lexical signature index.
pub enum SignatureError {
    /// The index file could not be read.
    #[error("failed to read signature index at '{path}': {source}")]
    Io {
        /// Index file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The index file is not valid JSON in the expected shape.
    #[error("failed to parse signature index at '{path}': {source}")]
    Parse {
        /// Index file path.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// The index file parsed but contains no labels.
    #[error("signature index at '{path}' contains no labels")]
    Empty {
        /// Index file path.
        path: PathBuf,
    },
}

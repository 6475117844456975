use thiserror::Error;

/// Errors surfaced by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Query or connection failure from the database driver.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Backend-level failure that is not a driver error (used by the mock
    /// to simulate outages).
    #[error("storage backend failure: {reason}")]
    Backend { reason: String },

    /// A row came back in a shape the store cannot interpret.
    #[error("malformed row: {reason}")]
    MalformedRow { reason: String },
}

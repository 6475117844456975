use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by entity resolution. Storage failures are fatal for the
/// page; partially written entities are left in place.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

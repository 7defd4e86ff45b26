//! Error types.

use std::collections::TryReserveError;
use thiserror::Error;

/// Why `resize` left the table untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResizeError {
    /// The new bucket array could not be allocated.
    #[error("failed to allocate {requested} buckets")]
    AllocationFailed {
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    /// A table needs at least one bucket.
    #[error("bucket count must be nonzero")]
    ZeroSize,
}

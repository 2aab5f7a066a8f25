//! Shared error types for the services crate.

use thiserror::Error;

use progress_core::ModelError;
use storage::{SqliteInitError, StorageError};

/// Causes behind a degraded `ProgressStore` result.
///
/// The fail-soft API logs these and returns defaults; the `try_*` methods
/// hand them to the caller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressStoreError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("invalid submission: {0}")]
    InvalidSubmission(#[from] ModelError),
    #[error("malformed stored data under {key}: {source}")]
    Malformed {
        key: String,
        source: serde_json::Error,
    },
    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}

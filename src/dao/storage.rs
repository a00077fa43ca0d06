//! Backend-neutral storage failure reported to the service layer.

use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Failure of a score store, whatever the backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not serve the request.
    #[error("{backend} unavailable: {message}")]
    Unavailable {
        /// Backend name (`supabase`, `memory`).
        backend: &'static str,
        /// Context describing the failed operation.
        message: String,
        /// Backend error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Wrap a `backend` failure that happened while doing `message`.
    pub fn unavailable(
        backend: &'static str,
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        StorageError::Unavailable {
            backend,
            message: message.into(),
            source: Box::new(source),
        }
    }
}

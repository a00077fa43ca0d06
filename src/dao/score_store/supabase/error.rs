//! Error types shared by the Supabase storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Convenient result alias returning [`SupabaseDaoError`] failures.
pub type SupabaseResult<T> = Result<T, SupabaseDaoError>;

/// Failures that can occur while interacting with the Supabase REST API.
#[derive(Debug, Error)]
pub enum SupabaseDaoError {
    /// Required environment variable is missing.
    #[error("missing Supabase environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build Supabase client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request to a table endpoint could not be sent.
    #[error("failed to send Supabase request to `{table}`")]
    RequestSend {
        table: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// Supabase returned an unexpected status code for a table endpoint.
    #[error("unexpected Supabase response status {status} for `{table}`")]
    RequestStatus {
        table: &'static str,
        status: StatusCode,
    },
    /// Response payload could not be parsed into the expected rows.
    #[error("failed to decode Supabase response for `{table}`")]
    DecodeResponse {
        table: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// An insert answered without returning the created row.
    #[error("Supabase insert into `{table}` returned no row")]
    MissingRow { table: &'static str },
}

impl From<SupabaseDaoError> for StorageError {
    fn from(err: SupabaseDaoError) -> Self {
        StorageError::unavailable("supabase", "request failed", err)
    }
}

//! Contract between the reconciliation controller and whatever serves the player and
//! channel data. Every failure comes back as a [`RemoteError`]; nothing panics or retries.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::client::records::{ChannelRecord, PlayerRecord, ResetSummary};

/// Result alias for remote store operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Coarse classification of a remote failure, as reported by [`RemoteError::class`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The request never produced an HTTP response.
    Network,
    /// The server answered with a 4xx status.
    Http4xx,
    /// The server answered with a 5xx status.
    Http5xx,
    /// The response could not be understood.
    MalformedResponse,
}

/// Failure raised by a [`RemoteStore`] operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The server could not be reached.
    #[error("network error: {0}")]
    Transport(String),
    /// The server refused the request (4xx other than 404).
    #[error("{message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body, or the status reason.
        message: String,
    },
    /// The identifier is unknown to the server.
    #[error("not found: {message}")]
    NotFound {
        /// Message extracted from the response body.
        message: String,
    },
    /// The server failed while talking to its store (5xx).
    #[error("server error ({status}): {message}")]
    StoreFailure {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body, or the status reason.
        message: String,
    },
    /// The response body did not decode into the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl RemoteError {
    /// Text the server sent for HTTP failures, or the full description otherwise.
    pub fn server_message(&self) -> String {
        match self {
            RemoteError::Rejected { message, .. }
            | RemoteError::NotFound { message }
            | RemoteError::StoreFailure { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Classify the failure the way callers report it.
    pub fn class(&self) -> FailureClass {
        match self {
            RemoteError::Transport(_) => FailureClass::Network,
            RemoteError::Rejected { .. } | RemoteError::NotFound { .. } => FailureClass::Http4xx,
            RemoteError::StoreFailure { .. } => FailureClass::Http5xx,
            RemoteError::Malformed(_) => FailureClass::MalformedResponse,
        }
    }

    /// Build the error matching an unsuccessful HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => RemoteError::NotFound { message },
            400..=499 => RemoteError::Rejected { status, message },
            500..=599 => RemoteError::StoreFailure { status, message },
            _ => RemoteError::Malformed(format!("unexpected status {status}: {message}")),
        }
    }
}

/// Operations the client needs from the score server.
pub trait RemoteStore: Send + Sync {
    /// Fetch every player, ordered by score descending.
    fn list_players(&self) -> BoxFuture<'static, RemoteResult<Vec<PlayerRecord>>>;
    /// Create a player with a zero score.
    fn add_player(
        &self,
        name: String,
        avatar_url: String,
    ) -> BoxFuture<'static, RemoteResult<PlayerRecord>>;
    /// Persist a new absolute score for a player.
    fn update_score(&self, id: String, score: u32)
    -> BoxFuture<'static, RemoteResult<PlayerRecord>>;
    /// Delete a player, returning the confirmation message.
    fn delete_player(&self, id: String) -> BoxFuture<'static, RemoteResult<String>>;
    /// Fetch every channel.
    fn list_channels(&self) -> BoxFuture<'static, RemoteResult<Vec<ChannelRecord>>>;
    /// Reset all scores; the password is checked by the server only.
    fn reset_scores(&self, password: String) -> BoxFuture<'static, RemoteResult<ResetSummary>>;
}

//! Per-session context owned by the controller: cached data, feedback slots and the last
//! load error of each collection.

use std::time::Duration;

use crate::client::{cache::LocalCache, feedback::FeedbackBoard};

/// Load failure recorded for each collection; `None` once a later load succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadErrors {
    /// Message describing the last failed players fetch.
    pub players: Option<String>,
    /// Message describing the last failed channels fetch.
    pub channels: Option<String>,
}

/// Everything a page session knows locally.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) cache: LocalCache,
    pub(crate) feedback: FeedbackBoard,
    pub(crate) load_errors: LoadErrors,
}

impl Session {
    /// Start an empty session whose feedback messages live for `feedback_ttl`.
    pub fn new(feedback_ttl: Duration) -> Self {
        Self {
            cache: LocalCache::new(),
            feedback: FeedbackBoard::new(feedback_ttl),
            load_errors: LoadErrors::default(),
        }
    }

    /// Cached players and channels.
    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    /// Feedback slots.
    pub fn feedback(&self) -> &FeedbackBoard {
        &self.feedback
    }

    /// Last load failures.
    pub fn load_errors(&self) -> &LoadErrors {
        &self.load_errors
    }
}

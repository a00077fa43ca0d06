//! Records held by the client-side cache, mirroring the JSON the server returns.

use serde::{Deserialize, Serialize};

/// A player row as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Identifier assigned by the store on creation; never reused.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Opaque avatar URL.
    pub avatar_url: String,
    /// Current score. Never negative.
    #[serde(default)]
    pub score: u32,
}

/// A channel row populated by the external ingestion system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Channel username, not guaranteed unique.
    pub username: String,
    /// Number of scheduled messages stored for the channel.
    #[serde(default)]
    pub scheduled_messages_count: i64,
}

/// Result of a bulk score reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSummary {
    /// Human readable outcome returned by the server.
    pub message: String,
    /// Number of players whose score was rewritten.
    #[serde(default)]
    pub count: u64,
}

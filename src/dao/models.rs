use serde::{Deserialize, Serialize};

/// Player row as persisted by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Identifier assigned by the store on insert.
    pub id: String,
    /// Display name, stored trimmed.
    pub name: String,
    /// Avatar URL, stored trimmed.
    pub avatar_url: String,
    /// Current score.
    pub score: u32,
}

/// Fields required to insert a player; the score always starts at zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewPlayerEntity {
    /// Display name.
    pub name: String,
    /// Avatar URL.
    pub avatar_url: String,
}

/// Channel row written by the ingestion system and only read here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelEntity {
    /// Channel username.
    pub username: String,
    /// Stored count of scheduled messages.
    #[serde(default)]
    pub scheduled_messages_count: i64,
}

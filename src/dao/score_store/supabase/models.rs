use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dao::models::{ChannelEntity, NewPlayerEntity, PlayerEntity};

pub const PLAYERS_TABLE: &str = "players";
pub const CHANNELS_TABLE: &str = "channels";
pub const CHANNEL_COLUMNS: &str = "username,scheduled_messages_count";

const UNNAMED_PLAYER: &str = "Unnamed Player";

/// Player row as returned by PostgREST. Columns may be null and the identifier may be a
/// UUID or a number depending on the table definition.
#[derive(Debug, Deserialize)]
pub struct PlayerRow {
    pub id: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
}

impl From<PlayerRow> for PlayerEntity {
    fn from(row: PlayerRow) -> Self {
        let id = match row.id {
            Value::String(id) => id,
            other => other.to_string(),
        };
        let score = row
            .score
            .map(|score| u32::try_from(score.max(0)).unwrap_or(u32::MAX))
            .unwrap_or(0);

        Self {
            id,
            name: row.name.unwrap_or_else(|| UNNAMED_PLAYER.into()),
            avatar_url: row.avatar_url.unwrap_or_default(),
            score,
        }
    }
}

/// Insert payload for the players table.
#[derive(Debug, Serialize)]
pub struct InsertPlayerRow {
    pub name: String,
    pub avatar_url: String,
    pub score: u32,
}

impl From<NewPlayerEntity> for InsertPlayerRow {
    fn from(player: NewPlayerEntity) -> Self {
        Self {
            name: player.name,
            avatar_url: player.avatar_url,
            score: 0,
        }
    }
}

/// Partial update touching only the score column.
#[derive(Debug, Serialize)]
pub struct ScorePatch {
    pub score: u32,
}

/// Channel row as returned by PostgREST.
#[derive(Debug, Deserialize)]
pub struct ChannelRow {
    pub username: Option<String>,
    #[serde(default)]
    pub scheduled_messages_count: Option<i64>,
}

impl From<ChannelRow> for ChannelEntity {
    fn from(row: ChannelRow) -> Self {
        Self {
            username: row.username.unwrap_or_default(),
            scheduled_messages_count: row.scheduled_messages_count.unwrap_or(0),
        }
    }
}

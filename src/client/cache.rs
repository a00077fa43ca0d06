//! In-session copy of the players and channels collections.

use tracing::warn;

use crate::client::records::{ChannelRecord, PlayerRecord};

/// Players and channels as last seen by this session.
///
/// Every operation is synchronous and total: unknown identifiers are ignored rather than
/// reported as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalCache {
    players: Vec<PlayerRecord>,
    channels: Vec<ChannelRecord>,
}

impl LocalCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Players in fetch order.
    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    /// Channels in fetch order.
    pub fn channels(&self) -> &[ChannelRecord] {
        &self.channels
    }

    /// Look up a player by identifier.
    pub fn player(&self, id: &str) -> Option<&PlayerRecord> {
        self.players.iter().find(|player| player.id == id)
    }

    /// Replace the whole player collection, keeping the order given.
    pub fn replace_players(&mut self, players: Vec<PlayerRecord>) {
        self.players = players;
    }

    /// Replace the whole channel collection.
    pub fn replace_channels(&mut self, channels: Vec<ChannelRecord>) {
        self.channels = channels;
    }

    /// Overwrite the score of `id`. Returns `false`, and logs a sync anomaly, when the
    /// player is not cached.
    pub fn upsert_player_score(&mut self, id: &str, score: u32) -> bool {
        match self.players.iter_mut().find(|player| player.id == id) {
            Some(player) => {
                player.score = score;
                true
            }
            None => {
                warn!(player_id = %id, score, "sync anomaly: score for a player missing from cache");
                false
            }
        }
    }

    /// Drop a player from the cache; unknown identifiers are ignored.
    pub fn remove_player(&mut self, id: &str) {
        self.players.retain(|player| player.id != id);
    }

    /// Append a player at the end of the collection.
    pub fn append_player(&mut self, record: PlayerRecord) {
        self.players.push(record);
    }

    /// Sum of every cached score.
    pub fn total_score(&self) -> u64 {
        self.players.iter().map(|player| u64::from(player.score)).sum()
    }
}

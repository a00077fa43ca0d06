/// In-memory backend.
pub mod memory;
/// Supabase (PostgREST) backend.
#[cfg(feature = "supabase-store")]
pub mod supabase;

use crate::dao::models::{ChannelEntity, NewPlayerEntity, PlayerEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Abstraction over the persistence layer holding the players and channels tables.
pub trait ScoreStore: Send + Sync {
    /// Every player, highest score first; ties keep insertion order.
    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>>;
    /// Insert a player with a zero score and return the stored row.
    fn insert_player(&self, player: NewPlayerEntity)
    -> BoxFuture<'static, StorageResult<PlayerEntity>>;
    /// Overwrite a player's score; `None` when the identifier is unknown.
    fn update_score(
        &self,
        id: String,
        score: u32,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>>;
    /// Delete a player and return how many rows went away.
    fn delete_player(&self, id: String) -> BoxFuture<'static, StorageResult<u64>>;
    /// Zero every non-zero score and return how many rows changed.
    fn reset_scores(&self) -> BoxFuture<'static, StorageResult<u64>>;
    /// Every channel row.
    fn list_channels(&self) -> BoxFuture<'static, StorageResult<Vec<ChannelEntity>>>;
    /// Cheap round trip proving the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

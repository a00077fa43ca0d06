//! Process-local store used when no database is configured, and by tests.

use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    models::{ChannelEntity, NewPlayerEntity, PlayerEntity},
    score_store::ScoreStore,
    storage::StorageResult,
};

#[derive(Default)]
struct Tables {
    players: IndexMap<String, PlayerEntity>,
    channels: Vec<ChannelEntity>,
}

/// In-memory [`ScoreStore`] keeping players in insertion order.
#[derive(Clone, Default)]
pub struct MemoryScoreStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryScoreStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with channel rows, standing in for the ingestion system.
    pub fn with_channels(channels: Vec<ChannelEntity>) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables {
                players: IndexMap::new(),
                channels,
            })),
        }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let guard = tables.read().await;
            let mut players: Vec<PlayerEntity> = guard.players.values().cloned().collect();
            players.sort_by(|a, b| b.score.cmp(&a.score));
            Ok(players)
        })
    }

    fn insert_player(
        &self,
        player: NewPlayerEntity,
    ) -> BoxFuture<'static, StorageResult<PlayerEntity>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let entity = PlayerEntity {
                id: Uuid::new_v4().to_string(),
                name: player.name,
                avatar_url: player.avatar_url,
                score: 0,
            };
            tables
                .write()
                .await
                .players
                .insert(entity.id.clone(), entity.clone());
            Ok(entity)
        })
    }

    fn update_score(
        &self,
        id: String,
        score: u32,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            Ok(guard.players.get_mut(&id).map(|player| {
                player.score = score;
                player.clone()
            }))
        })
    }

    fn delete_player(&self, id: String) -> BoxFuture<'static, StorageResult<u64>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let removed = tables.write().await.players.shift_remove(&id);
            Ok(u64::from(removed.is_some()))
        })
    }

    fn reset_scores(&self) -> BoxFuture<'static, StorageResult<u64>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut guard = tables.write().await;
            let mut count = 0;
            for player in guard.players.values_mut().filter(|p| p.score != 0) {
                player.score = 0;
                count += 1;
            }
            Ok(count)
        })
    }

    fn list_channels(&self) -> BoxFuture<'static, StorageResult<Vec<ChannelEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.channels.clone()) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_player(name: &str) -> NewPlayerEntity {
        NewPlayerEntity {
            name: name.into(),
            avatar_url: format!("{name}.png"),
        }
    }

    #[tokio::test]
    async fn players_are_listed_by_score_then_insertion() {
        let store = MemoryScoreStore::new();
        let ann = store.insert_player(new_player("Ann")).await.unwrap();
        let bob = store.insert_player(new_player("Bob")).await.unwrap();
        let cy = store.insert_player(new_player("Cy")).await.unwrap();
        store.update_score(cy.id.clone(), 4).await.unwrap();

        let names: Vec<_> = store
            .list_players()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["Cy", "Ann", "Bob"]);
        assert_ne!(ann.id, bob.id);
    }

    #[tokio::test]
    async fn update_and_delete_report_unknown_ids() {
        let store = MemoryScoreStore::new();
        assert_eq!(store.update_score("nope".into(), 3).await.unwrap(), None);
        assert_eq!(store.delete_player("nope".into()).await.unwrap(), 0);

        let ann = store.insert_player(new_player("Ann")).await.unwrap();
        assert_eq!(store.delete_player(ann.id).await.unwrap(), 1);
        assert!(store.list_players().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reset_counts_only_non_zero_scores() {
        let store = MemoryScoreStore::new();
        let ann = store.insert_player(new_player("Ann")).await.unwrap();
        store.insert_player(new_player("Bob")).await.unwrap();
        store.update_score(ann.id, 9).await.unwrap();

        assert_eq!(store.reset_scores().await.unwrap(), 1);
        assert!(
            store
                .list_players()
                .await
                .unwrap()
                .iter()
                .all(|p| p.score == 0)
        );
    }
}

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, header::HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::dao::{
    models::{ChannelEntity, NewPlayerEntity, PlayerEntity},
    score_store::ScoreStore,
    storage::StorageResult,
};

use super::{
    config::SupabaseConfig,
    error::{SupabaseDaoError, SupabaseResult},
    models::{
        CHANNEL_COLUMNS, CHANNELS_TABLE, ChannelRow, InsertPlayerRow, PLAYERS_TABLE, PlayerRow,
        ScorePatch,
    },
};

const REST_PREFIX: &str = "rest/v1";
const RETURN_REPRESENTATION: &str = "return=representation";

/// [`ScoreStore`] backed by a Supabase project through its PostgREST endpoint.
#[derive(Clone)]
pub struct SupabaseScoreStore {
    client: Client,
    base_url: Arc<str>,
    service_key: Arc<str>,
}

impl SupabaseScoreStore {
    /// Build the client and verify the players table answers.
    pub async fn connect(config: SupabaseConfig) -> SupabaseResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| SupabaseDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            service_key: Arc::from(config.service_key),
        };

        store.ping().await?;
        Ok(store)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let url = format!("{}/{}/{}", self.base_url, REST_PREFIX, table);
        self.client
            .request(method, url)
            .header("apikey", self.service_key.as_ref())
            .bearer_auth(self.service_key.as_ref())
    }

    fn returning(builder: RequestBuilder) -> RequestBuilder {
        builder.header("Prefer", HeaderValue::from_static(RETURN_REPRESENTATION))
    }

    async fn fetch_rows<T>(table: &'static str, builder: RequestBuilder) -> SupabaseResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let response = builder
            .send()
            .await
            .map_err(|source| SupabaseDaoError::RequestSend { table, source })?;

        if !response.status().is_success() {
            return Err(SupabaseDaoError::RequestStatus {
                table,
                status: response.status(),
            });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|source| SupabaseDaoError::DecodeResponse { table, source })
    }

    fn update_score_request(&self, id: &str, score: u32) -> RequestBuilder {
        Self::returning(self.request(Method::PATCH, PLAYERS_TABLE))
            .query(&[("id", format!("eq.{id}"))])
            .json(&ScorePatch { score })
    }

    fn delete_request(&self, id: &str) -> RequestBuilder {
        Self::returning(self.request(Method::DELETE, PLAYERS_TABLE))
            .query(&[("id", format!("eq.{id}"))])
    }

    fn reset_request(&self) -> RequestBuilder {
        Self::returning(self.request(Method::PATCH, PLAYERS_TABLE))
            .query(&[("score", "neq.0")])
            .json(&ScorePatch { score: 0 })
    }

    async fn ping(&self) -> SupabaseResult<()> {
        let builder = self
            .request(Method::GET, PLAYERS_TABLE)
            .query(&[("select", "id"), ("limit", "1")]);
        Self::fetch_rows::<serde_json::Value>(PLAYERS_TABLE, builder)
            .await
            .map(|_| ())
    }
}

impl ScoreStore for SupabaseScoreStore {
    fn list_players(&self) -> BoxFuture<'static, StorageResult<Vec<PlayerEntity>>> {
        let builder = self
            .request(Method::GET, PLAYERS_TABLE)
            .query(&[("select", "*"), ("order", "score.desc")]);
        Box::pin(async move {
            let rows = Self::fetch_rows::<PlayerRow>(PLAYERS_TABLE, builder).await?;
            debug!(count = rows.len(), "fetched players");
            Ok(rows.into_iter().map(PlayerEntity::from).collect())
        })
    }

    fn insert_player(
        &self,
        player: NewPlayerEntity,
    ) -> BoxFuture<'static, StorageResult<PlayerEntity>> {
        let builder = Self::returning(self.request(Method::POST, PLAYERS_TABLE))
            .json(&[InsertPlayerRow::from(player)]);
        Box::pin(async move {
            let rows = Self::fetch_rows::<PlayerRow>(PLAYERS_TABLE, builder).await?;
            rows.into_iter()
                .next()
                .map(PlayerEntity::from)
                .ok_or(SupabaseDaoError::MissingRow {
                    table: PLAYERS_TABLE,
                })
                .map_err(Into::into)
        })
    }

    fn update_score(
        &self,
        id: String,
        score: u32,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerEntity>>> {
        let builder = self.update_score_request(&id, score);
        Box::pin(async move {
            let rows = Self::fetch_rows::<PlayerRow>(PLAYERS_TABLE, builder).await?;
            Ok(rows.into_iter().next().map(PlayerEntity::from))
        })
    }

    fn delete_player(&self, id: String) -> BoxFuture<'static, StorageResult<u64>> {
        let builder = self.delete_request(&id);
        Box::pin(async move {
            let rows = Self::fetch_rows::<PlayerRow>(PLAYERS_TABLE, builder).await?;
            Ok(rows.len() as u64)
        })
    }

    fn reset_scores(&self) -> BoxFuture<'static, StorageResult<u64>> {
        let builder = self.reset_request();
        Box::pin(async move {
            let rows = Self::fetch_rows::<PlayerRow>(PLAYERS_TABLE, builder).await?;
            Ok(rows.len() as u64)
        })
    }

    fn list_channels(&self) -> BoxFuture<'static, StorageResult<Vec<ChannelEntity>>> {
        let builder = self
            .request(Method::GET, CHANNELS_TABLE)
            .query(&[("select", CHANNEL_COLUMNS)]);
        Box::pin(async move {
            let rows = Self::fetch_rows::<ChannelRow>(CHANNELS_TABLE, builder).await?;
            Ok(rows.into_iter().map(ChannelEntity::from).collect())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.ping().await.map_err(|err| {
                warn!(error = %err, "supabase reconnect probe failed");
                err.into()
            })
        })
    }
}

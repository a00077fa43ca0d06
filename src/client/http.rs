//! [`RemoteStore`] implementation talking JSON over HTTP to the scoreboard server.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::client::{
    records::{ChannelRecord, PlayerRecord, ResetSummary},
    remote::{RemoteError, RemoteResult, RemoteStore},
};

const PLAYERS_PATH: &str = "players";
const SCORE_PATH: &str = "players/score";
const DELETE_PATH: &str = "players/delete";
const RESET_PATH: &str = "players/reset";
const CHANNELS_PATH: &str = "channels";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddPlayerBody {
    name: String,
    avatar_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateScoreBody {
    player_id: String,
    new_score: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeletePlayerBody {
    player_id: String,
}

#[derive(Serialize)]
struct ResetBody {
    password: String,
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

/// HTTP client for the scoreboard server routes.
#[derive(Clone)]
pub struct HttpRemoteStore {
    client: Client,
    base_url: Arc<str>,
}

impl HttpRemoteStore {
    /// Build a client targeting `base_url` (e.g. `http://localhost:8080`).
    pub fn new(base_url: impl AsRef<str>) -> RemoteResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(client: Client, base_url: impl AsRef<str>) -> Self {
        Self {
            client,
            base_url: Arc::from(base_url.as_ref().trim_end_matches('/')),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        self.client.request(method, url)
    }

    async fn send<T>(builder: RequestBuilder) -> RemoteResult<T>
    where
        T: DeserializeOwned,
    {
        let response = builder
            .send()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;

        if !status.is_success() {
            let fallback = status.canonical_reason().unwrap_or("request failed");
            return Err(RemoteError::from_status(
                status.as_u16(),
                error_detail(&body, fallback),
            ));
        }

        serde_json::from_str(&body).map_err(|err| RemoteError::Malformed(err.to_string()))
    }
}

/// Pull a human readable message out of an error body, preferring `message`, then `error`,
/// then the raw text.
fn error_detail(body: &str, fallback: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(Value::String(text)) = map.get(key) {
                return text.clone();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.starts_with('{') {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

impl RemoteStore for HttpRemoteStore {
    fn list_players(&self) -> BoxFuture<'static, RemoteResult<Vec<PlayerRecord>>> {
        let builder = self.request(Method::GET, PLAYERS_PATH);
        Box::pin(Self::send(builder))
    }

    fn add_player(
        &self,
        name: String,
        avatar_url: String,
    ) -> BoxFuture<'static, RemoteResult<PlayerRecord>> {
        let builder = self
            .request(Method::POST, PLAYERS_PATH)
            .json(&AddPlayerBody { name, avatar_url });
        Box::pin(Self::send(builder))
    }

    fn update_score(
        &self,
        id: String,
        score: u32,
    ) -> BoxFuture<'static, RemoteResult<PlayerRecord>> {
        let builder = self.request(Method::POST, SCORE_PATH).json(&UpdateScoreBody {
            player_id: id,
            new_score: score,
        });
        Box::pin(Self::send(builder))
    }

    fn delete_player(&self, id: String) -> BoxFuture<'static, RemoteResult<String>> {
        let builder = self
            .request(Method::POST, DELETE_PATH)
            .json(&DeletePlayerBody { player_id: id });
        Box::pin(async move {
            let body: MessageBody = Self::send(builder).await?;
            Ok(body.message)
        })
    }

    fn list_channels(&self) -> BoxFuture<'static, RemoteResult<Vec<ChannelRecord>>> {
        let builder = self.request(Method::GET, CHANNELS_PATH);
        Box::pin(Self::send(builder))
    }

    fn reset_scores(&self, password: String) -> BoxFuture<'static, RemoteResult<ResetSummary>> {
        let builder = self
            .request(Method::POST, RESET_PATH)
            .json(&ResetBody { password });
        Box::pin(Self::send(builder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail_prefers_message_then_error() {
        assert_eq!(
            error_detail(r#"{"message":"bad request: name"}"#, "Bad Request"),
            "bad request: name"
        );
        assert_eq!(
            error_detail(r#"{"error":"Failed to add player","details":"x"}"#, "oops"),
            "Failed to add player"
        );
    }

    #[test]
    fn error_detail_falls_back_to_text_or_reason() {
        assert_eq!(
            error_detail("Forbidden: Incorrect password", "Forbidden"),
            "Forbidden: Incorrect password"
        );
        assert_eq!(error_detail("  ", "Forbidden"), "Forbidden");
        assert_eq!(error_detail(r#"{"details":1}"#, "Forbidden"), "Forbidden");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let store = HttpRemoteStore::with_client(Client::new(), "http://localhost:8080/");
        assert_eq!(&*store.base_url, "http://localhost:8080");
    }
}

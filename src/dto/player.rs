//! Request and response bodies of the player routes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{dao::models::PlayerEntity, dto::validation::validate_not_blank};

/// Body of `POST /players`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddPlayerRequest {
    /// Display name.
    #[serde(default)]
    #[validate(custom(function = validate_not_blank))]
    pub name: String,
    /// Avatar URL.
    #[serde(default)]
    #[validate(custom(function = validate_not_blank))]
    pub avatar_url: String,
}

/// Body of `POST /players/score`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScoreRequest {
    /// Player identifier.
    #[serde(default)]
    #[validate(custom(function = validate_not_blank))]
    pub player_id: String,
    /// Absolute score; fractional values are floored, negatives are refused.
    #[serde(default)]
    #[schema(value_type = f64)]
    pub new_score: serde_json::Value,
}

/// Body of `POST /players/delete`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeletePlayerRequest {
    /// Player identifier.
    #[serde(default)]
    #[validate(custom(function = validate_not_blank))]
    pub player_id: String,
}

/// Body of `POST /players/reset`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetScoresRequest {
    /// Admin password.
    #[serde(default)]
    pub password: String,
}

/// Player as returned by every player route.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PlayerResponse {
    /// Identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Avatar URL.
    pub avatar_url: String,
    /// Current score.
    pub score: u32,
}

impl From<PlayerEntity> for PlayerResponse {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            avatar_url: value.avatar_url,
            score: value.score,
        }
    }
}

/// Generic acknowledgement carrying a human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    /// Outcome description.
    pub message: String,
}

/// Result of `POST /players/reset`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResetResponse {
    /// Outcome description, e.g. `Scores reset for 3 players.`.
    pub message: String,
    /// Number of rows whose score was rewritten.
    pub count: u64,
}

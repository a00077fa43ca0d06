//! Business logic behind the player routes. Every operation resolves the current store first
//! so requests made while degraded fail fast with [`ServiceError::Degraded`].

use tracing::{debug, info, warn};

use crate::{
    dao::models::NewPlayerEntity,
    dto::{
        player::{
            ActionResponse, AddPlayerRequest, DeletePlayerRequest, PlayerResponse,
            ResetResponse, ResetScoresRequest, UpdateScoreRequest,
        },
        validation::floor_score,
    },
    error::ServiceError,
    state::SharedState,
};

/// All players ordered by score, highest first.
pub async fn list_players(state: &SharedState) -> Result<Vec<PlayerResponse>, ServiceError> {
    let store = state.require_score_store().await?;
    let players = store.list_players().await?;
    debug!(count = players.len(), "listed players");
    Ok(players.into_iter().map(Into::into).collect())
}

/// Insert a player with trimmed fields and a zero score.
pub async fn add_player(
    state: &SharedState,
    request: AddPlayerRequest,
) -> Result<PlayerResponse, ServiceError> {
    let name = request.name.trim();
    let avatar_url = request.avatar_url.trim();
    if name.is_empty() || avatar_url.is_empty() {
        return Err(ServiceError::InvalidInput(
            "name and avatarUrl are required".into(),
        ));
    }

    let store = state.require_score_store().await?;
    let created = store
        .insert_player(NewPlayerEntity {
            name: name.to_string(),
            avatar_url: avatar_url.to_string(),
        })
        .await?;
    info!(player_id = %created.id, name = %created.name, "player added");
    Ok(created.into())
}

/// Overwrite a player's score with the floored value of `newScore`.
pub async fn update_score(
    state: &SharedState,
    request: UpdateScoreRequest,
) -> Result<PlayerResponse, ServiceError> {
    let player_id = request.player_id.trim();
    if player_id.is_empty() {
        return Err(ServiceError::InvalidInput("playerId is required".into()));
    }
    let score = floor_score(&request.new_score).ok_or_else(|| {
        ServiceError::InvalidInput("newScore must be a non-negative number".into())
    })?;

    let store = state.require_score_store().await?;
    match store.update_score(player_id.to_string(), score).await? {
        Some(player) => {
            debug!(player_id, score, "score updated");
            Ok(player.into())
        }
        None => {
            warn!(player_id, "score update for unknown player");
            Err(ServiceError::NotFound("Player not found".into()))
        }
    }
}

/// Delete a player; an unknown identifier still answers with success.
pub async fn delete_player(
    state: &SharedState,
    request: DeletePlayerRequest,
) -> Result<ActionResponse, ServiceError> {
    let player_id = request.player_id.trim();
    if player_id.is_empty() {
        return Err(ServiceError::InvalidInput("playerId is required".into()));
    }

    let store = state.require_score_store().await?;
    let removed = store.delete_player(player_id.to_string()).await?;
    if removed == 0 {
        warn!(player_id, "delete requested for unknown player");
    } else {
        info!(player_id, "player deleted");
    }
    Ok(ActionResponse {
        message: "Player deleted successfully".into(),
    })
}

/// Zero every non-zero score once the admin password matches.
pub async fn reset_scores(
    state: &SharedState,
    request: ResetScoresRequest,
) -> Result<ResetResponse, ServiceError> {
    let Some(expected) = state.admin_password() else {
        warn!("reset requested but no admin password is configured");
        return Err(ServiceError::Misconfigured("admin password not set".into()));
    };
    if request.password.is_empty() || request.password != expected {
        warn!("incorrect or missing admin password for reset attempt");
        return Err(ServiceError::Forbidden("Incorrect password".into()));
    }

    let store = state.require_score_store().await?;
    let count = store.reset_scores().await?;
    info!(count, "scores reset");
    Ok(ResetResponse {
        message: format!("Scores reset for {count} players."),
        count,
    })
}

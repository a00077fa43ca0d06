use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::player::{
        ActionResponse, AddPlayerRequest, DeletePlayerRequest, PlayerResponse, ResetResponse,
        ResetScoresRequest, UpdateScoreRequest,
    },
    error::AppError,
    services::player_service,
    state::SharedState,
};

/// Player roster, score and reset endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/players", get(list_players).post(add_player))
        .route("/players/score", post(update_score))
        .route("/players/delete", post(delete_player))
        .route("/players/reset", post(reset_scores))
}

/// List every player, highest score first.
#[utoipa::path(
    get,
    path = "/players",
    tag = "players",
    responses(
        (status = 200, description = "Players ordered by score", body = [PlayerResponse]),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn list_players(
    State(state): State<SharedState>,
) -> Result<Json<Vec<PlayerResponse>>, AppError> {
    Ok(Json(player_service::list_players(&state).await?))
}

/// Create a player with a zero score.
#[utoipa::path(
    post,
    path = "/players",
    tag = "players",
    request_body = AddPlayerRequest,
    responses(
        (status = 201, description = "Player created", body = PlayerResponse),
        (status = 400, description = "Blank name or avatar URL"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn add_player(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<AddPlayerRequest>>,
) -> Result<(StatusCode, Json<PlayerResponse>), AppError> {
    let created = player_service::add_player(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Overwrite a player's score.
#[utoipa::path(
    post,
    path = "/players/score",
    tag = "players",
    request_body = UpdateScoreRequest,
    responses(
        (status = 200, description = "Updated player", body = PlayerResponse),
        (status = 400, description = "Missing id or invalid score"),
        (status = 404, description = "Unknown player"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn update_score(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<UpdateScoreRequest>>,
) -> Result<Json<PlayerResponse>, AppError> {
    Ok(Json(player_service::update_score(&state, payload).await?))
}

/// Delete a player. Unknown identifiers are acknowledged as well.
#[utoipa::path(
    post,
    path = "/players/delete",
    tag = "players",
    request_body = DeletePlayerRequest,
    responses(
        (status = 200, description = "Player deleted or absent", body = ActionResponse),
        (status = 400, description = "Missing id"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn delete_player(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<DeletePlayerRequest>>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(player_service::delete_player(&state, payload).await?))
}

/// Zero every score after checking the admin password.
#[utoipa::path(
    post,
    path = "/players/reset",
    tag = "players",
    request_body = ResetScoresRequest,
    responses(
        (status = 200, description = "Scores reset", body = ResetResponse),
        (status = 403, description = "Incorrect password"),
        (status = 500, description = "Admin password not configured"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn reset_scores(
    State(state): State<SharedState>,
    Json(payload): Json<ResetScoresRequest>,
) -> Result<Json<ResetResponse>, AppError> {
    Ok(Json(player_service::reset_scores(&state, payload).await?))
}

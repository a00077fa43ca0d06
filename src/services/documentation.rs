use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the scoreboard server.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::players::list_players,
        crate::routes::players::add_player,
        crate::routes::players::update_score,
        crate::routes::players::delete_player,
        crate::routes::players::reset_scores,
        crate::routes::channels::list_channels,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::player::AddPlayerRequest,
            crate::dto::player::UpdateScoreRequest,
            crate::dto::player::DeletePlayerRequest,
            crate::dto::player::ResetScoresRequest,
            crate::dto::player::PlayerResponse,
            crate::dto::player::ActionResponse,
            crate::dto::player::ResetResponse,
            crate::dto::channel::ChannelResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "players", description = "Player roster and scores"),
        (name = "channels", description = "Channel progress rows"),
    )
)]
pub struct ApiDoc;

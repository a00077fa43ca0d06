use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::channel::ChannelResponse, error::AppError, services::channel_service,
    state::SharedState,
};

/// Channel read endpoints.
pub fn router() -> Router<SharedState> {
    Router::new().route("/channels", get(list_channels))
}

/// List channel rows with their scheduled message counts.
#[utoipa::path(
    get,
    path = "/channels",
    tag = "channels",
    responses(
        (status = 200, description = "Channel rows", body = [ChannelResponse]),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn list_channels(
    State(state): State<SharedState>,
) -> Result<Json<Vec<ChannelResponse>>, AppError> {
    Ok(Json(channel_service::list_channels(&state).await?))
}

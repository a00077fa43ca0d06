use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::SharedState;

/// Channel routes.
pub mod channels;
/// Swagger UI and OpenAPI document.
pub mod docs;
/// Health route.
pub mod health;
/// Player routes.
pub mod players;

/// Compose all route trees and attach shared state plus the cross-cutting layers.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(players::router())
        .merge(channels::router())
        .merge(docs::router())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

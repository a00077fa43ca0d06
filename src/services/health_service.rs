use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the installed store; anything but a successful round trip reports degraded.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let store = match state.require_score_store().await {
        Ok(store) => store,
        Err(_) => {
            warn!("storage unavailable (degraded mode)");
            return HealthResponse::degraded();
        }
    };

    match store.health_check().await {
        Ok(()) => HealthResponse::ok(),
        Err(err) => {
            warn!(error = %err, "storage health check failed");
            HealthResponse::degraded()
        }
    }
}

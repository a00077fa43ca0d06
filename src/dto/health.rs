use serde::Serialize;
use utoipa::ToSchema;

/// Store reachability as seen by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Store reachable.
    Ok,
    /// No store, or the store is not answering.
    Degraded,
}

/// Body returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Current status.
    pub status: HealthStatus,
}

impl HealthResponse {
    /// Store reachable.
    pub fn ok() -> Self {
        Self {
            status: HealthStatus::Ok,
        }
    }

    /// Store unavailable.
    pub fn degraded() -> Self {
        Self {
            status: HealthStatus::Degraded,
        }
    }
}

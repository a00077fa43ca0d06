/// Channel read operations.
pub mod channel_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Player CRUD and score reset.
pub mod player_service;
/// Storage connection supervisor with backoff and degraded mode.
pub mod storage_supervisor;

//! Scoreboard library: the client-side reconciliation core plus the server that stores
//! players and channels, shared by the binaries and integration tests.

/// Client core: cache, derivations, controller and the remote store client.
pub mod client;
/// Client and server configuration.
pub mod config;
/// Server-side persistence.
pub mod dao;
/// HTTP request and response bodies.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// HTTP routes.
pub mod routes;
/// Business logic behind the routes.
pub mod services;
/// Shared server state.
pub mod state;

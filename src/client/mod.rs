//! Browser-side logic of the scoreboard: a cache of players and channels kept in step with
//! the server, and the values derived from it for display.

/// Local cache of players and channels.
pub mod cache;
/// Reconciliation controller and the typed intents it accepts.
pub mod controller;
/// Pure display derivations (ranking, prizes, standings, progress).
pub mod derive;
/// Transient user-facing messages.
pub mod feedback;
/// HTTP implementation of the remote store contract.
pub mod http;
/// Records exchanged with the server.
pub mod records;
/// Remote store contract and failure taxonomy.
pub mod remote;
/// Per-session context.
pub mod session;
/// Board render model.
pub mod view;

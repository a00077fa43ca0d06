/// Database model definitions.
pub mod models;
/// Player and channel persistence backends.
pub mod score_store;
/// Storage abstraction layer for database operations.
pub mod storage;

mod config;
mod error;
mod models;
mod store;

pub use config::SupabaseConfig;
pub use error::SupabaseDaoError;
pub use store::SupabaseScoreStore;

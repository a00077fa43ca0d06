use super::error::{SupabaseDaoError, SupabaseResult};

/// Runtime configuration describing how to reach the Supabase REST endpoint.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    /// Service role key sent as `apikey` and bearer token.
    pub service_key: String,
}

impl SupabaseConfig {
    /// Construct a configuration from an explicit project URL and service key.
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            service_key: service_key.into(),
        }
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> SupabaseResult<Self> {
        let base_url = std::env::var("SUPABASE_URL").map_err(|_| {
            SupabaseDaoError::MissingEnvVar {
                var: "SUPABASE_URL",
            }
        })?;
        let service_key = std::env::var("SUPABASE_SERVICE_KEY").map_err(|_| {
            SupabaseDaoError::MissingEnvVar {
                var: "SUPABASE_SERVICE_KEY",
            }
        })?;

        Ok(Self::new(base_url, service_key))
    }
}

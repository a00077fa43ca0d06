//! Scoreboard server entrypoint wiring the HTTP routes to a score store.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scoreboard::{
    config::ServerSettings,
    dao::score_store::memory::MemoryScoreStore,
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let settings = ServerSettings::from_env();
    let app_state = install_store(settings.clone()).await;
    let app = routes::router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Pick the store: Supabase under supervision when configured, otherwise in-memory.
async fn install_store(settings: ServerSettings) -> SharedState {
    #[cfg(feature = "supabase-store")]
    {
        use scoreboard::{
            dao::score_store::{
                ScoreStore,
                supabase::{SupabaseConfig, SupabaseScoreStore},
            },
            dao::storage::StorageError,
            services::storage_supervisor,
        };

        match SupabaseConfig::from_env() {
            Ok(config) => {
                info!(url = %config.base_url, "using Supabase score store");
                let state = AppState::new(settings.admin_password);
                tokio::spawn(storage_supervisor::run(state.clone(), move || {
                    let config = config.clone();
                    async move {
                        let store = SupabaseScoreStore::connect(config)
                            .await
                            .map_err(StorageError::from)?;
                        Ok::<Arc<dyn ScoreStore>, StorageError>(Arc::new(store))
                    }
                }));
                return state;
            }
            Err(err) => info!(reason = %err, "Supabase not configured"),
        }
    }

    info!(
        channels = settings.seed_channels.len(),
        "using in-memory score store"
    );
    let store = MemoryScoreStore::with_channels(settings.seed_channels);
    AppState::with_store(Arc::new(store), settings.admin_password).await
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{dao::score_store::ScoreStore, error::ServiceError};

/// Handle shared by every route handler.
pub type SharedState = Arc<AppState>;

/// Central application state holding the store handle and the admin secret.
pub struct AppState {
    score_store: RwLock<Option<Arc<dyn ScoreStore>>>,
    degraded: watch::Sender<bool>,
    admin_password: Option<String>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(admin_password: Option<String>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            score_store: RwLock::new(None),
            degraded: degraded_tx,
            admin_password,
        })
    }

    /// Construct a state with `store` installed right away.
    pub async fn with_store(
        store: Arc<dyn ScoreStore>,
        admin_password: Option<String>,
    ) -> SharedState {
        let state = Self::new(admin_password);
        state.set_score_store(store).await;
        state
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn score_store(&self) -> Option<Arc<dyn ScoreStore>> {
        let guard = self.score_store.read().await;
        guard.as_ref().cloned()
    }

    /// Return the store or fail with [`ServiceError::Degraded`].
    pub async fn require_score_store(&self) -> Result<Arc<dyn ScoreStore>, ServiceError> {
        if *self.degraded.borrow() {
            return Err(ServiceError::Degraded);
        }
        self.score_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new store implementation and leave degraded mode.
    pub async fn set_score_store(&self, store: Arc<dyn ScoreStore>) {
        {
            let mut guard = self.score_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Password expected by the reset endpoint, if configured.
    pub fn admin_password(&self) -> Option<&str> {
        self.admin_password.as_deref()
    }
}

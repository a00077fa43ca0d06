//! Keeps a remote score store connected: connects with exponential backoff, polls its health
//! and flips the shared state into degraded mode while it cannot be reached.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{score_store::ScoreStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

fn next_delay(delay: Duration) -> Duration {
    (delay * 2).min(MAX_DELAY)
}

/// Connect through `connect` until it succeeds, then watch the store; start over when the
/// store stays unreachable after [`MAX_RECONNECT_ATTEMPTS`] probes.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn ScoreStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                state.set_score_store(store.clone()).await;
                info!("storage connection established; leaving degraded mode");
                delay = INITIAL_DELAY;

                watch(&state, store.as_ref()).await;
                warn!("exhausted storage reconnect attempts; staying in degraded mode");
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
            }
        }
        sleep(delay).await;
        delay = next_delay(delay);
    }
}

/// Poll `store` until it cannot be brought back.
async fn watch(state: &SharedState, store: &dyn ScoreStore) {
    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded().await {
                    info!("storage healthy again; leaving degraded mode");
                    state.update_degraded(false).await;
                }
            }
            Err(err) => {
                warn!(error = %err, "storage health check failed; entering degraded mode");
                state.update_degraded(true).await;
                if !reconnect(store).await {
                    return;
                }
                info!("storage reconnection succeeded after health check failure");
                state.update_degraded(false).await;
            }
        }
        sleep(HEALTH_POLL_INTERVAL).await;
    }
}

async fn reconnect(store: &dyn ScoreStore) -> bool {
    let mut delay = INITIAL_DELAY;
    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => return true,
            Err(err) => {
                warn!(attempt, error = %err, "storage reconnect attempt failed");
                sleep(delay).await;
                delay = next_delay(delay);
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::{dao::score_store::memory::MemoryScoreStore, state::AppState};

    #[test]
    fn backoff_doubles_up_to_the_cap() {
        assert_eq!(next_delay(INITIAL_DELAY), Duration::from_secs(2));
        assert_eq!(next_delay(Duration::from_secs(8)), MAX_DELAY);
        assert_eq!(next_delay(MAX_DELAY), MAX_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_the_store_connects() {
        let state = AppState::new(None);
        let attempts = Arc::new(AtomicU32::new(0));

        let counter = attempts.clone();
        let supervisor = tokio::spawn(run(state.clone(), move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(StorageError::unavailable(
                        "test",
                        "connect",
                        std::io::Error::other("refused"),
                    ))
                } else {
                    Ok(Arc::new(MemoryScoreStore::new()) as Arc<dyn ScoreStore>)
                }
            }
        }));

        for _ in 0..20 {
            if !state.is_degraded().await {
                break;
            }
            sleep(Duration::from_millis(500)).await;
        }

        assert!(!state.is_degraded().await);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        supervisor.abort();
    }
}

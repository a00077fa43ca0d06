use tracing::debug;

use crate::{dto::channel::ChannelResponse, error::ServiceError, state::SharedState};

/// Channel rows in store order.
pub async fn list_channels(state: &SharedState) -> Result<Vec<ChannelResponse>, ServiceError> {
    let store = state.require_score_store().await?;
    let channels = store.list_channels().await?;
    debug!(count = channels.len(), "listed channels");
    Ok(channels.into_iter().map(Into::into).collect())
}

use serde::Serialize;
use utoipa::ToSchema;

use crate::dao::models::ChannelEntity;

/// Channel row as exposed by `GET /channels`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChannelResponse {
    /// Channel username.
    pub username: String,
    /// Stored count of scheduled messages.
    pub scheduled_messages_count: i64,
}

impl From<ChannelEntity> for ChannelResponse {
    fn from(value: ChannelEntity) -> Self {
        Self {
            username: value.username,
            scheduled_messages_count: value.scheduled_messages_count,
        }
    }
}

//! Dialog message types - where a campaign is mirrored in chat

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// A posted dialog message, addressed by channel and message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DialogLocation {
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
}

impl DialogLocation {
    #[inline]
    pub const fn new(channel_id: Snowflake, message_id: Snowflake) -> Self {
        Self {
            channel_id,
            message_id,
        }
    }
}

/// A message read back from channel history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    pub author_id: Snowflake,
    pub content: String,
}

impl PostedMessage {
    pub fn location(&self) -> DialogLocation {
        DialogLocation::new(self.channel_id, self.id)
    }
}

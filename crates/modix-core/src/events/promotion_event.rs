//! Promotion events - notifications consumed by the dialog behavior
//!
//! Campaign events are published by the promotion service; reaction and
//! message events are forwarded by the host from the chat gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{CampaignId, CampaignOutcome};
use crate::value_objects::Snowflake;

/// All promotion events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionEvent {
    CampaignCreated(CampaignCreatedEvent),
    CampaignClosed(CampaignClosedEvent),
    ReactionAdded(ReactionAddedEvent),
    MessageDeleted(MessageDeletedEvent),
}

impl PromotionEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::CampaignCreated(_) => "CAMPAIGN_CREATED",
            Self::CampaignClosed(_) => "CAMPAIGN_CLOSED",
            Self::ReactionAdded(_) => "REACTION_ADDED",
            Self::MessageDeleted(_) => "MESSAGE_DELETED",
        }
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::CampaignCreated(e) => e.timestamp,
            Self::CampaignClosed(e) => e.timestamp,
            Self::ReactionAdded(e) => e.timestamp,
            Self::MessageDeleted(e) => e.timestamp,
        }
    }

    /// Guild the event belongs to
    pub fn guild_id(&self) -> Snowflake {
        match self {
            Self::CampaignCreated(e) => e.guild_id,
            Self::CampaignClosed(e) => e.guild_id,
            Self::ReactionAdded(e) => e.guild_id,
            Self::MessageDeleted(e) => e.guild_id,
        }
    }
}

// ============================================================================
// Event Structs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignCreatedEvent {
    pub campaign_id: CampaignId,
    pub guild_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignClosedEvent {
    pub campaign_id: CampaignId,
    pub guild_id: Snowflake,
    pub outcome: CampaignOutcome,
    pub closed_by: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionAddedEvent {
    pub guild_id: Snowflake,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub user_id: Snowflake,
    pub emoji: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDeletedEvent {
    pub guild_id: Snowflake,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_and_guild() {
        let event = PromotionEvent::CampaignClosed(CampaignClosedEvent {
            campaign_id: CampaignId::new(3),
            guild_id: Snowflake::new(9),
            outcome: CampaignOutcome::Approved,
            closed_by: Snowflake::new(1),
            timestamp: Utc::now(),
        });
        assert_eq!(event.event_type(), "CAMPAIGN_CLOSED");
        assert_eq!(event.guild_id(), Snowflake::new(9));
    }

    #[test]
    fn test_serialized_tag() {
        let event = PromotionEvent::ReactionAdded(ReactionAddedEvent {
            guild_id: Snowflake::new(1),
            channel_id: Snowflake::new(2),
            message_id: Snowflake::new(3),
            user_id: Snowflake::new(4),
            emoji: "👍".to_string(),
            timestamp: Utc::now(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "REACTION_ADDED");
        assert_eq!(json["message_id"], "3");
    }
}

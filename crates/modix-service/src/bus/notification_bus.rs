//! Notification bus
//!
//! Broadcast channel carrying [`PromotionEvent`]s from publishers (the
//! promotion service and the host's gateway glue) to behaviors.

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, trace};

use modix_core::{
    CampaignClosedEvent, CampaignCreatedEvent, CampaignId, CampaignOutcome, PromotionEvent,
    Snowflake,
};

/// Fan-out publisher for promotion events
///
/// Publishing never blocks. A subscriber that falls more than the buffer
/// behind skips the oldest events and is told how many it missed.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<PromotionEvent>,
}

impl NotificationBus {
    /// Create a bus buffering up to `buffer` events per subscriber
    ///
    /// A zero buffer is bumped to one.
    pub fn new(buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer.max(1));
        Self { sender }
    }

    /// Subscribe to every event published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<PromotionEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publish an event, returning how many subscribers received it
    pub fn publish(&self, event: PromotionEvent) -> usize {
        let event_type = event.event_type();
        match self.sender.send(event) {
            Ok(receivers) => {
                trace!(event = event_type, receivers, "Published promotion event");
                receivers
            }
            Err(_) => {
                debug!(event = event_type, "No subscribers for promotion event");
                0
            }
        }
    }

    /// Publish a CAMPAIGN_CREATED event
    pub fn publish_campaign_created(
        &self,
        campaign_id: CampaignId,
        guild_id: Snowflake,
        timestamp: DateTime<Utc>,
    ) -> usize {
        self.publish(PromotionEvent::CampaignCreated(CampaignCreatedEvent {
            campaign_id,
            guild_id,
            timestamp,
        }))
    }

    /// Publish a CAMPAIGN_CLOSED event
    pub fn publish_campaign_closed(
        &self,
        campaign_id: CampaignId,
        guild_id: Snowflake,
        outcome: CampaignOutcome,
        closed_by: Snowflake,
        timestamp: DateTime<Utc>,
    ) -> usize {
        self.publish(PromotionEvent::CampaignClosed(CampaignClosedEvent {
            campaign_id,
            guild_id,
            outcome,
            closed_by,
            timestamp,
        }))
    }
}

//! Promotion events carried on the notification bus

mod promotion_event;

pub use promotion_event::{
    CampaignClosedEvent, CampaignCreatedEvent, MessageDeletedEvent, PromotionEvent,
    ReactionAddedEvent,
};

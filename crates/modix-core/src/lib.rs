//! # modix-core
//!
//! Domain layer for promotion campaigns: entities, value objects, vote
//! aggregation, repository and collaborator traits, and promotion events.
//! This crate has zero dependencies on infrastructure (database, chat gateway, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod tally;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    CampaignCloseAction, CampaignCreateAction, CampaignId, CampaignOutcome, CampaignStatus,
    CloseRequest, CommentOutcome, CommentResult, DialogLocation, NewCampaign, PostedMessage,
    PromotionCampaign, PromotionComment, DEFAULT_CAMPAIGN_ACCEPT_COOLDOWN_HOURS,
    MAX_COMMENT_LENGTH,
};
pub use error::DomainError;
pub use events::{
    CampaignClosedEvent, CampaignCreatedEvent, MessageDeletedEvent, PromotionEvent,
    ReactionAddedEvent,
};
pub use tally::{format_remaining, CampaignTally};
pub use traits::{
    AuthorizationProvider, CampaignQuery, CampaignRepository, ChannelDesignation, Clock,
    CommentRepository, DesignatedChannelLookup, MessageLookup, MessagingClient, RepoResult,
    SystemClock,
};
pub use value_objects::{
    AuthenticatedUser, AuthorizationClaims, PromotionSentiment, SentimentParseError, Snowflake,
    SnowflakeParseError,
};

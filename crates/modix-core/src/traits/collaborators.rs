//! Collaborator traits - chat platform and authorization services

use async_trait::async_trait;

use crate::entities::PostedMessage;
use crate::error::DomainError;
use crate::value_objects::{AuthenticatedUser, Snowflake};

/// Categories of bot-posted content a guild can route to a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelDesignation {
    PromotionDialog,
}

impl ChannelDesignation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PromotionDialog => "PromotionDialog",
        }
    }
}

#[async_trait]
pub trait DesignatedChannelLookup: Send + Sync {
    /// Channels in `guild_id` flagged with `designation` (may be empty)
    async fn channels_for_designation(
        &self,
        guild_id: Snowflake,
        designation: ChannelDesignation,
    ) -> Result<Vec<Snowflake>, DomainError>;
}

/// Outbound chat operations
///
/// Implementations apply their own timeout and retry policy.
#[async_trait]
pub trait MessagingClient: Send + Sync {
    /// The bot's own user ID
    fn current_user_id(&self) -> Snowflake;

    async fn send_message(&self, channel_id: Snowflake, content: &str)
        -> Result<Snowflake, DomainError>;

    async fn edit_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        content: &str,
    ) -> Result<(), DomainError>;

    async fn delete_message(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
    ) -> Result<(), DomainError>;

    async fn add_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> Result<(), DomainError>;

    async fn remove_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> Result<(), DomainError>;
}

/// Read access to channel history
#[async_trait]
pub trait MessageLookup: Send + Sync {
    /// Up to `limit` most recent messages in a channel, newest first
    async fn recent_messages(
        &self,
        channel_id: Snowflake,
        limit: usize,
    ) -> Result<Vec<PostedMessage>, DomainError>;
}

#[async_trait]
pub trait AuthorizationProvider: Send + Sync {
    /// Resolve a member's claims in a guild
    ///
    /// Fails with `AuthenticationFailed` when the user is not a member or
    /// cannot be resolved.
    async fn authenticate(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> Result<AuthenticatedUser, DomainError>;
}

//! Service context - dependency container for services
//!
//! Holds the repositories, chat collaborators, notification bus, clock and
//! promotion settings needed by the promotion service and the dialog behavior.

use std::sync::Arc;

use modix_common::{BusConfig, PromotionConfig};
use modix_core::traits::{
    AuthorizationProvider, CampaignRepository, Clock, CommentRepository, DesignatedChannelLookup,
    MessageLookup, MessagingClient, SystemClock,
};
use modix_db::{InMemoryPromotionStore, PgCampaignRepository, PgCommentRepository, PgPool};

use super::error::{ServiceError, ServiceResult};
use crate::bus::NotificationBus;

/// Service context containing all dependencies
///
/// Cheap to clone; every dependency sits behind an `Arc`.
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    campaign_repo: Arc<dyn CampaignRepository>,
    comment_repo: Arc<dyn CommentRepository>,

    // Chat platform
    channels: Arc<dyn DesignatedChannelLookup>,
    messenger: Arc<dyn MessagingClient>,
    message_lookup: Arc<dyn MessageLookup>,
    authorization: Arc<dyn AuthorizationProvider>,

    // Events
    bus: NotificationBus,

    clock: Arc<dyn Clock>,
    config: PromotionConfig,
}

impl ServiceContext {
    // === Repositories ===

    /// Get the campaign repository
    pub fn campaign_repo(&self) -> &dyn CampaignRepository {
        self.campaign_repo.as_ref()
    }

    /// Get the comment repository
    pub fn comment_repo(&self) -> &dyn CommentRepository {
        self.comment_repo.as_ref()
    }

    // === Chat Platform ===

    /// Get the designated channel lookup
    pub fn channels(&self) -> &dyn DesignatedChannelLookup {
        self.channels.as_ref()
    }

    /// Get the messaging client
    pub fn messenger(&self) -> &dyn MessagingClient {
        self.messenger.as_ref()
    }

    /// Get the channel history lookup
    pub fn message_lookup(&self) -> &dyn MessageLookup {
        self.message_lookup.as_ref()
    }

    /// Get the authorization provider
    pub fn authorization(&self) -> &dyn AuthorizationProvider {
        self.authorization.as_ref()
    }

    // === Events ===

    /// Get the notification bus
    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    // === Settings ===

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn config(&self) -> &PromotionConfig {
        &self.config
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("collaborators", &"...")
            .field("bus_receivers", &self.bus.receiver_count())
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    campaign_repo: Option<Arc<dyn CampaignRepository>>,
    comment_repo: Option<Arc<dyn CommentRepository>>,
    channels: Option<Arc<dyn DesignatedChannelLookup>>,
    messenger: Option<Arc<dyn MessagingClient>>,
    message_lookup: Option<Arc<dyn MessageLookup>>,
    authorization: Option<Arc<dyn AuthorizationProvider>>,
    bus: Option<NotificationBus>,
    clock: Option<Arc<dyn Clock>>,
    config: PromotionConfig,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            campaign_repo: None,
            comment_repo: None,
            channels: None,
            messenger: None,
            message_lookup: None,
            authorization: None,
            bus: None,
            clock: None,
            config: PromotionConfig::default(),
        }
    }

    /// Use PostgreSQL repositories backed by `pool`
    pub fn postgres(self, pool: PgPool) -> Self {
        self.campaign_repo(Arc::new(PgCampaignRepository::new(pool.clone())))
            .comment_repo(Arc::new(PgCommentRepository::new(pool)))
    }

    /// Use one in-memory store for both repositories
    pub fn in_memory(self, store: Arc<InMemoryPromotionStore>) -> Self {
        self.campaign_repo(store.clone()).comment_repo(store)
    }

    pub fn campaign_repo(mut self, repo: Arc<dyn CampaignRepository>) -> Self {
        self.campaign_repo = Some(repo);
        self
    }

    pub fn comment_repo(mut self, repo: Arc<dyn CommentRepository>) -> Self {
        self.comment_repo = Some(repo);
        self
    }

    pub fn channels(mut self, lookup: Arc<dyn DesignatedChannelLookup>) -> Self {
        self.channels = Some(lookup);
        self
    }

    pub fn messenger(mut self, messenger: Arc<dyn MessagingClient>) -> Self {
        self.messenger = Some(messenger);
        self
    }

    pub fn message_lookup(mut self, lookup: Arc<dyn MessageLookup>) -> Self {
        self.message_lookup = Some(lookup);
        self
    }

    pub fn authorization(mut self, provider: Arc<dyn AuthorizationProvider>) -> Self {
        self.authorization = Some(provider);
        self
    }

    pub fn bus(mut self, bus: NotificationBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn config(mut self, config: PromotionConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the ServiceContext
    ///
    /// The bus and clock fall back to a fresh bus and the wall clock.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            campaign_repo: self
                .campaign_repo
                .ok_or_else(|| ServiceError::validation("campaign_repo is required"))?,
            comment_repo: self
                .comment_repo
                .ok_or_else(|| ServiceError::validation("comment_repo is required"))?,
            channels: self
                .channels
                .ok_or_else(|| ServiceError::validation("channels is required"))?,
            messenger: self
                .messenger
                .ok_or_else(|| ServiceError::validation("messenger is required"))?,
            message_lookup: self
                .message_lookup
                .ok_or_else(|| ServiceError::validation("message_lookup is required"))?,
            authorization: self
                .authorization
                .ok_or_else(|| ServiceError::validation("authorization is required"))?,
            bus: self
                .bus
                .unwrap_or_else(|| NotificationBus::new(BusConfig::default().buffer)),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            config: self.config,
        })
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

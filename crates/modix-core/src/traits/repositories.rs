//! Repository traits (ports) - define the interface for campaign persistence
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Each call is transactional on its own.

use async_trait::async_trait;

use crate::entities::{
    CampaignId, CampaignStatus, NewCampaign, PromotionCampaign, PromotionComment,
};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Filters for campaign searches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignQuery {
    pub status: Option<CampaignStatus>,
    pub subject_id: Option<Snowflake>,
    /// Maximum number of rows, newest first
    pub limit: Option<u32>,
}

impl CampaignQuery {
    pub const DEFAULT_LIMIT: u32 = 50;
    pub const MAX_LIMIT: u32 = 100;

    /// Effective limit, clamped to `1..=MAX_LIMIT`
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

// ============================================================================
// Campaign Repository
// ============================================================================

#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// Find campaign by ID
    async fn find_by_id(&self, id: CampaignId) -> RepoResult<Option<PromotionCampaign>>;

    /// All active campaigns in a guild
    async fn find_active_by_guild(&self, guild_id: Snowflake)
        -> RepoResult<Vec<PromotionCampaign>>;

    /// The active campaign for a subject, if any
    async fn find_active_by_subject(
        &self,
        guild_id: Snowflake,
        subject_id: Snowflake,
    ) -> RepoResult<Option<PromotionCampaign>>;

    /// Campaigns in a guild matching `query`, newest first
    async fn search(
        &self,
        guild_id: Snowflake,
        query: &CampaignQuery,
    ) -> RepoResult<Vec<PromotionCampaign>>;

    /// Persist a new active campaign and return it with its assigned ID
    async fn create(&self, campaign: &NewCampaign) -> RepoResult<PromotionCampaign>;

    /// Persist a closed campaign
    ///
    /// Only succeeds while the stored campaign is still active; a concurrent
    /// closer that got there first yields `CampaignAlreadyClosed`.
    async fn save(&self, campaign: &PromotionCampaign) -> RepoResult<()>;
}

// ============================================================================
// Comment Repository
// ============================================================================

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// All comments on a campaign
    async fn find_by_campaign(&self, campaign_id: CampaignId)
        -> RepoResult<Vec<PromotionComment>>;

    /// The comment an author left on a campaign
    async fn find(
        &self,
        campaign_id: CampaignId,
        author_id: Snowflake,
    ) -> RepoResult<Option<PromotionComment>>;

    /// Insert or overwrite the author's comment
    ///
    /// Only succeeds while the campaign is active; otherwise `CampaignClosed`.
    async fn upsert(&self, comment: &PromotionComment) -> RepoResult<()>;
}

//! In-memory campaign and comment store
//!
//! Campaigns and comments sit behind one lock so the "still active" guards on
//! close and comment writes are checked and applied atomically.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::instrument;

use modix_core::entities::{
    CampaignId, CampaignStatus, NewCampaign, PromotionCampaign, PromotionComment,
};
use modix_core::error::DomainError;
use modix_core::traits::{CampaignQuery, CampaignRepository, CommentRepository, RepoResult};
use modix_core::value_objects::Snowflake;

#[derive(Default)]
struct State {
    next_id: i64,
    campaigns: BTreeMap<CampaignId, PromotionCampaign>,
    comments: HashMap<CampaignId, BTreeMap<Snowflake, PromotionComment>>,
}

/// In-memory implementation of both promotion repositories
#[derive(Default)]
pub struct InMemoryPromotionStore {
    state: RwLock<State>,
}

impl InMemoryPromotionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored campaigns, active or closed
    pub fn campaign_count(&self) -> usize {
        self.state.read().campaigns.len()
    }

    /// Number of stored comments across all campaigns
    pub fn comment_count(&self) -> usize {
        self.state.read().comments.values().map(BTreeMap::len).sum()
    }
}

#[async_trait]
impl CampaignRepository for InMemoryPromotionStore {
    async fn find_by_id(&self, id: CampaignId) -> RepoResult<Option<PromotionCampaign>> {
        Ok(self.state.read().campaigns.get(&id).cloned())
    }

    async fn find_active_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<PromotionCampaign>> {
        let state = self.state.read();
        Ok(state
            .campaigns
            .values()
            .filter(|c| c.guild_id() == guild_id && c.is_active())
            .cloned()
            .collect())
    }

    async fn find_active_by_subject(
        &self,
        guild_id: Snowflake,
        subject_id: Snowflake,
    ) -> RepoResult<Option<PromotionCampaign>> {
        let state = self.state.read();
        Ok(state
            .campaigns
            .values()
            .find(|c| c.guild_id() == guild_id && c.subject_id == subject_id && c.is_active())
            .cloned())
    }

    async fn search(
        &self,
        guild_id: Snowflake,
        query: &CampaignQuery,
    ) -> RepoResult<Vec<PromotionCampaign>> {
        let state = self.state.read();
        let mut matches: Vec<_> = state
            .campaigns
            .values()
            .filter(|c| c.guild_id() == guild_id)
            .filter(|c| query.subject_id.is_none_or(|s| c.subject_id == s))
            .filter(|c| query.status.is_none_or(|s| c.status() == s))
            .cloned()
            .collect();

        matches.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(b.id.cmp(&a.id)));
        matches.truncate(query.effective_limit() as usize);
        Ok(matches)
    }

    #[instrument(skip(self))]
    async fn create(&self, campaign: &NewCampaign) -> RepoResult<PromotionCampaign> {
        let mut state = self.state.write();

        let duplicate = state.campaigns.values().any(|c| {
            c.guild_id() == campaign.guild_id
                && c.subject_id == campaign.subject_id
                && c.status() == CampaignStatus::Active
        });
        if duplicate {
            return Err(DomainError::CampaignAlreadyActive {
                subject_id: campaign.subject_id,
            });
        }

        state.next_id += 1;
        let created = PromotionCampaign::open(CampaignId::new(state.next_id), campaign.clone());
        state.campaigns.insert(created.id, created.clone());
        Ok(created)
    }

    #[instrument(skip(self, campaign), fields(campaign_id = %campaign.id))]
    async fn save(&self, campaign: &PromotionCampaign) -> RepoResult<()> {
        let mut state = self.state.write();
        let stored = state
            .campaigns
            .get_mut(&campaign.id)
            .ok_or(DomainError::CampaignNotFound(campaign.id))?;

        if campaign.is_active() {
            return Ok(());
        }
        if !stored.is_active() {
            return Err(DomainError::CampaignAlreadyClosed(campaign.id));
        }

        *stored = campaign.clone();
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryPromotionStore {
    async fn find_by_campaign(&self, campaign_id: CampaignId) -> RepoResult<Vec<PromotionComment>> {
        let state = self.state.read();
        Ok(state
            .comments
            .get(&campaign_id)
            .map(|by_author| by_author.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn find(
        &self,
        campaign_id: CampaignId,
        author_id: Snowflake,
    ) -> RepoResult<Option<PromotionComment>> {
        let state = self.state.read();
        Ok(state
            .comments
            .get(&campaign_id)
            .and_then(|by_author| by_author.get(&author_id))
            .cloned())
    }

    #[instrument(skip(self, comment), fields(campaign_id = %comment.campaign_id, author_id = %comment.author_id))]
    async fn upsert(&self, comment: &PromotionComment) -> RepoResult<()> {
        let mut state = self.state.write();
        match state.campaigns.get(&comment.campaign_id) {
            None => return Err(DomainError::CampaignNotFound(comment.campaign_id)),
            Some(c) if !c.is_active() => return Err(DomainError::CampaignClosed(c.id)),
            Some(_) => {}
        }

        state
            .comments
            .entry(comment.campaign_id)
            .or_default()
            .insert(comment.author_id, comment.clone());
        Ok(())
    }
}

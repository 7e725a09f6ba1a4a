//! Promotion service
//!
//! Handles campaign creation, voting, closing and queries.

use tracing::{info, instrument};
use validator::Validate;

use modix_core::tally;
use modix_core::{
    AuthenticatedUser, AuthorizationClaims, CampaignId, CampaignOutcome, CampaignQuery,
    CampaignTally, CloseRequest, DomainError, NewCampaign, PromotionCampaign, PromotionComment,
    PromotionSentiment,
};

use super::context::ServiceContext;
use super::error::ServiceResult;
use crate::dto::{
    CampaignDetailResponse, CampaignSummaryResponse, CampaignWithTally, CloseCampaignRequest,
    CommentRequest, CommentResponse, CreateCampaignRequest,
};

/// Promotion service for campaign lifecycle and voting
pub struct PromotionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PromotionService<'a> {
    /// Create a new PromotionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Open a campaign nominating a member for a role
    ///
    /// The creator's comment is recorded as their approving vote.
    #[instrument(skip(self, actor, request), fields(guild_id = %actor.guild_id, user_id = %actor.user_id))]
    pub async fn create_campaign(
        &self,
        actor: &AuthenticatedUser,
        request: CreateCampaignRequest,
    ) -> ServiceResult<CampaignSummaryResponse> {
        actor.require(AuthorizationClaims::PROMOTIONS_CREATE_CAMPAIGN)?;
        request.validate()?;

        if request.subject_id == actor.user_id {
            return Err(DomainError::CannotCommentOnOwnCampaign.into());
        }

        if self
            .ctx
            .campaign_repo()
            .find_active_by_subject(actor.guild_id, request.subject_id)
            .await?
            .is_some()
        {
            return Err(DomainError::CampaignAlreadyActive {
                subject_id: request.subject_id,
            }
            .into());
        }

        let now = self.ctx.clock().now();
        let campaign = self
            .ctx
            .campaign_repo()
            .create(&NewCampaign::new(
                actor.guild_id,
                request.subject_id,
                request.target_role_id,
                actor.user_id,
                now,
            ))
            .await?;

        let opening = PromotionComment::create_or_update(
            None,
            &campaign,
            actor.user_id,
            PromotionSentiment::Approve,
            Some(request.comment),
            now,
        )?;
        self.ctx.comment_repo().upsert(&opening.comment).await?;

        self.ctx
            .bus()
            .publish_campaign_created(campaign.id, campaign.guild_id(), now);

        info!(
            campaign_id = %campaign.id,
            subject_id = %campaign.subject_id,
            target_role_id = %campaign.target_role_id,
            "Campaign created"
        );

        Ok(self.summarize(&campaign, CampaignTally::from_comments([&opening.comment])))
    }

    /// Cast or replace the actor's vote on a campaign
    ///
    /// Does not publish anything; callers that display the campaign refresh
    /// it themselves.
    #[instrument(skip(self, actor, request), fields(user_id = %actor.user_id))]
    pub async fn create_or_update_comment(
        &self,
        actor: &AuthenticatedUser,
        campaign_id: CampaignId,
        request: CommentRequest,
    ) -> ServiceResult<CommentResponse> {
        actor.require(AuthorizationClaims::PROMOTIONS_COMMENT)?;
        request.validate()?;

        let campaign = self.load_for(actor, campaign_id).await?;
        let existing = self
            .ctx
            .comment_repo()
            .find(campaign.id, actor.user_id)
            .await?;

        let result = PromotionComment::create_or_update(
            existing,
            &campaign,
            actor.user_id,
            request.sentiment,
            request.body,
            self.ctx.clock().now(),
        )?;
        self.ctx.comment_repo().upsert(&result.comment).await?;

        info!(
            campaign_id = %campaign.id,
            sentiment = result.comment.sentiment.as_str(),
            outcome = ?result.outcome,
            "Comment recorded"
        );

        Ok(CommentResponse::from(&result))
    }

    /// Accept or reject a campaign
    #[instrument(skip(self, actor, request), fields(user_id = %actor.user_id))]
    pub async fn close_campaign(
        &self,
        actor: &AuthenticatedUser,
        campaign_id: CampaignId,
        request: CloseCampaignRequest,
    ) -> ServiceResult<CampaignSummaryResponse> {
        actor.require(AuthorizationClaims::PROMOTIONS_CLOSE_CAMPAIGN)?;
        if request.force {
            actor.require(AuthorizationClaims::PROMOTIONS_FORCE_CLOSE_CAMPAIGN)?;
        }

        let mut campaign = self.load_for(actor, campaign_id).await?;
        let now = self.ctx.clock().now();
        campaign.close(
            CloseRequest {
                outcome: request.outcome,
                closed_by: actor.user_id,
                now,
                force: request.force,
            },
            self.ctx.config().accept_cooldown(),
        )?;
        self.ctx.campaign_repo().save(&campaign).await?;

        self.ctx.bus().publish_campaign_closed(
            campaign.id,
            campaign.guild_id(),
            request.outcome,
            actor.user_id,
            now,
        );

        info!(
            campaign_id = %campaign.id,
            outcome = request.outcome.as_str(),
            forced = request.force,
            "Campaign closed"
        );

        let comments = self.ctx.comment_repo().find_by_campaign(campaign.id).await?;
        Ok(self.summarize(&campaign, CampaignTally::from_comments(&comments)))
    }

    /// Close a campaign as approved
    pub async fn accept_campaign(
        &self,
        actor: &AuthenticatedUser,
        campaign_id: CampaignId,
        force: bool,
    ) -> ServiceResult<CampaignSummaryResponse> {
        self.close_campaign(
            actor,
            campaign_id,
            CloseCampaignRequest {
                outcome: CampaignOutcome::Approved,
                force,
            },
        )
        .await
    }

    /// Close a campaign as denied
    pub async fn reject_campaign(
        &self,
        actor: &AuthenticatedUser,
        campaign_id: CampaignId,
        force: bool,
    ) -> ServiceResult<CampaignSummaryResponse> {
        self.close_campaign(
            actor,
            campaign_id,
            CloseCampaignRequest {
                outcome: CampaignOutcome::Denied,
                force,
            },
        )
        .await
    }

    /// Get a campaign with all of its comments
    #[instrument(skip(self, actor), fields(user_id = %actor.user_id))]
    pub async fn get_campaign(
        &self,
        actor: &AuthenticatedUser,
        campaign_id: CampaignId,
    ) -> ServiceResult<CampaignDetailResponse> {
        actor.require(AuthorizationClaims::PROMOTIONS_READ)?;

        let campaign = self.load_for(actor, campaign_id).await?;
        let comments = self.ctx.comment_repo().find_by_campaign(campaign.id).await?;
        let details = self.with_tally(&campaign, CampaignTally::from_comments(&comments));

        Ok(CampaignDetailResponse::new(details, &comments))
    }

    /// Search the actor's guild, newest first
    #[instrument(skip(self, actor), fields(guild_id = %actor.guild_id))]
    pub async fn search_campaigns(
        &self,
        actor: &AuthenticatedUser,
        query: CampaignQuery,
    ) -> ServiceResult<Vec<CampaignSummaryResponse>> {
        actor.require(AuthorizationClaims::PROMOTIONS_READ)?;

        let campaigns = self
            .ctx
            .campaign_repo()
            .search(actor.guild_id, &query)
            .await?;

        let mut responses = Vec::with_capacity(campaigns.len());
        for campaign in &campaigns {
            let comments = self.ctx.comment_repo().find_by_campaign(campaign.id).await?;
            responses.push(self.summarize(campaign, CampaignTally::from_comments(&comments)));
        }
        Ok(responses)
    }

    /// Load a campaign, hiding campaigns from other guilds
    async fn load_for(
        &self,
        actor: &AuthenticatedUser,
        campaign_id: CampaignId,
    ) -> ServiceResult<PromotionCampaign> {
        match self.ctx.campaign_repo().find_by_id(campaign_id).await? {
            Some(campaign) if campaign.guild_id() == actor.guild_id => Ok(campaign),
            _ => Err(DomainError::CampaignNotFound(campaign_id).into()),
        }
    }

    fn with_tally<'c>(
        &self,
        campaign: &'c PromotionCampaign,
        tally: CampaignTally,
    ) -> CampaignWithTally<'c> {
        CampaignWithTally {
            campaign,
            tally,
            closable_in: tally::time_until_closable(
                campaign,
                self.ctx.config().accept_cooldown(),
                self.ctx.clock().now(),
            ),
        }
    }

    fn summarize(
        &self,
        campaign: &PromotionCampaign,
        tally: CampaignTally,
    ) -> CampaignSummaryResponse {
        CampaignSummaryResponse::from(self.with_tally(campaign, tally))
    }
}

//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use chrono::Duration;

use modix_core::{CampaignTally, CommentResult, PromotionCampaign, PromotionComment};

use super::responses::{CampaignDetailResponse, CampaignSummaryResponse, CommentResponse};

// ============================================================================
// Comment Mappers
// ============================================================================

impl From<&PromotionComment> for CommentResponse {
    fn from(comment: &PromotionComment) -> Self {
        Self {
            campaign_id: comment.campaign_id,
            author_id: comment.author_id.to_string(),
            sentiment: comment.sentiment,
            body: comment.body.clone(),
            created_at: comment.created_at,
            modified_at: comment.modified_at,
            outcome: None,
        }
    }
}

impl From<&CommentResult> for CommentResponse {
    fn from(result: &CommentResult) -> Self {
        Self {
            outcome: Some(result.outcome),
            ..Self::from(&result.comment)
        }
    }
}

// ============================================================================
// Campaign Mappers
// ============================================================================

/// Helper struct for creating campaign responses with derived figures
pub struct CampaignWithTally<'a> {
    pub campaign: &'a PromotionCampaign,
    pub tally: CampaignTally,
    /// Time left on the cooldown; ignored for closed campaigns
    pub closable_in: Duration,
}

impl From<CampaignWithTally<'_>> for CampaignSummaryResponse {
    fn from(details: CampaignWithTally<'_>) -> Self {
        let campaign = details.campaign;
        let close = campaign.close_action();
        let closable_in_seconds = if campaign.is_active() {
            details.closable_in.num_seconds().max(0)
        } else {
            0
        };

        Self {
            id: campaign.id,
            guild_id: campaign.guild_id().to_string(),
            subject_id: campaign.subject_id.to_string(),
            target_role_id: campaign.target_role_id.to_string(),
            status: campaign.status(),
            created_by: campaign.create_action.created_by.to_string(),
            created_at: campaign.created_at(),
            closed_by: close.map(|c| c.closed_by.to_string()),
            closed_at: close.map(|c| c.closed_at),
            forced: close.is_some_and(|c| c.forced),
            approvals: details.tally.approvals,
            oppositions: details.tally.oppositions,
            abstentions: details.tally.abstentions,
            total_votes: details.tally.total_votes(),
            approval_percentage: details.tally.approval_percentage(),
            closable_in_seconds,
        }
    }
}

impl CampaignDetailResponse {
    pub fn new(details: CampaignWithTally<'_>, comments: &[PromotionComment]) -> Self {
        Self {
            campaign: CampaignSummaryResponse::from(details),
            comments: comments.iter().map(CommentResponse::from).collect(),
        }
    }
}

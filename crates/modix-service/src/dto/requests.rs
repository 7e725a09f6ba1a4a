//! Request DTOs for promotion operations
//!
//! All request DTOs implement `Deserialize`; those carrying free text also
//! implement `Validate`.

use serde::Deserialize;
use validator::Validate;

use modix_core::{CampaignOutcome, PromotionSentiment, Snowflake};

/// Open a campaign nominating `subject_id` for `target_role_id`
///
/// The comment becomes the creator's own approving vote.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCampaignRequest {
    pub subject_id: Snowflake,

    pub target_role_id: Snowflake,

    #[validate(length(min = 1, max = 1000, message = "Comment must be 1-1000 characters"))]
    pub comment: String,
}

/// Cast or replace a vote
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentRequest {
    pub sentiment: PromotionSentiment,

    /// `None` keeps the body of an earlier comment; an empty body clears it
    #[validate(length(max = 1000, message = "Comment must be at most 1000 characters"))]
    pub body: Option<String>,
}

impl CommentRequest {
    /// A bare vote, as cast through a dialog reaction
    pub fn vote(sentiment: PromotionSentiment) -> Self {
        Self {
            sentiment,
            body: None,
        }
    }
}

/// Accept or reject a campaign
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CloseCampaignRequest {
    pub outcome: CampaignOutcome,

    /// Close before the cooldown has elapsed
    #[serde(default)]
    pub force: bool,
}

//! Comment entity <-> model mapper

use modix_core::entities::{CampaignId, PromotionComment};
use modix_core::error::DomainError;
use modix_core::value_objects::{PromotionSentiment, Snowflake};

use crate::models::CommentModel;

/// Convert CommentModel to PromotionComment entity
impl TryFrom<CommentModel> for PromotionComment {
    type Error = DomainError;

    fn try_from(model: CommentModel) -> Result<Self, Self::Error> {
        let sentiment = PromotionSentiment::parse(&model.sentiment)
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        Ok(PromotionComment {
            campaign_id: CampaignId::new(model.campaign_id),
            author_id: Snowflake::new(model.author_id),
            sentiment,
            body: model.body,
            created_at: model.created_at,
            modified_at: model.modified_at,
        })
    }
}

/// Values for upserting a comment
pub struct CommentUpsert<'a> {
    pub campaign_id: i64,
    pub author_id: i64,
    pub sentiment: &'static str,
    pub body: Option<&'a str>,
}

impl<'a> CommentUpsert<'a> {
    pub fn new(comment: &'a PromotionComment) -> Self {
        Self {
            campaign_id: comment.campaign_id.into_inner(),
            author_id: comment.author_id.into_inner(),
            sentiment: comment.sentiment.as_str(),
            body: comment.body.as_deref(),
        }
    }
}

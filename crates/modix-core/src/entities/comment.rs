//! Promotion comment entity - one member's vote on a campaign
//!
//! Comments are keyed by (campaign, author). A second vote by the same author
//! overwrites the first; no history is kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CampaignId, PromotionCampaign};
use crate::error::DomainError;
use crate::value_objects::{PromotionSentiment, Snowflake};

/// Maximum comment body length in characters
pub const MAX_COMMENT_LENGTH: usize = 1000;

/// Promotion comment entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionComment {
    pub campaign_id: CampaignId,
    pub author_id: Snowflake,
    pub sentiment: PromotionSentiment,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

/// Whether a write created a new comment or replaced an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommentOutcome {
    Created,
    Updated,
}

/// Resulting comment plus the create/update flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentResult {
    pub comment: PromotionComment,
    pub outcome: CommentOutcome,
}

impl PromotionComment {
    /// Has the comment been overwritten since it was first cast?
    #[inline]
    pub fn is_modified(&self) -> bool {
        self.modified_at.is_some()
    }

    /// Last time the sentiment or body changed
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.modified_at.unwrap_or(self.created_at)
    }

    /// Create a comment, or overwrite the author's existing one
    ///
    /// The campaign must be active. A `None` body on update keeps the body the
    /// author wrote earlier; a blank body clears it.
    pub fn create_or_update(
        existing: Option<PromotionComment>,
        campaign: &PromotionCampaign,
        author_id: Snowflake,
        sentiment: PromotionSentiment,
        body: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<CommentResult, DomainError> {
        if !campaign.is_active() {
            return Err(DomainError::CampaignClosed(campaign.id));
        }
        if author_id == campaign.subject_id {
            return Err(DomainError::CannotCommentOnOwnCampaign);
        }

        let body = body.map(normalize_body).transpose()?;

        match existing {
            Some(mut comment) => {
                debug_assert_eq!(comment.campaign_id, campaign.id);
                debug_assert_eq!(comment.author_id, author_id);

                comment.sentiment = sentiment;
                if let Some(body) = body {
                    comment.body = body;
                }
                comment.modified_at = Some(now);
                Ok(CommentResult {
                    comment,
                    outcome: CommentOutcome::Updated,
                })
            }
            None => Ok(CommentResult {
                comment: PromotionComment {
                    campaign_id: campaign.id,
                    author_id,
                    sentiment,
                    body: body.flatten(),
                    created_at: now,
                    modified_at: None,
                },
                outcome: CommentOutcome::Created,
            }),
        }
    }
}

/// Trim a supplied body; blank means "no body"
fn normalize_body(body: String) -> Result<Option<String>, DomainError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_COMMENT_LENGTH {
        return Err(DomainError::ContentTooLong {
            max: MAX_COMMENT_LENGTH,
        });
    }
    Ok(Some(trimmed.to_string()))
}

//! Response DTOs for promotion operations
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use serde::Serialize;

use modix_core::{CampaignId, CampaignStatus, CommentOutcome, PromotionSentiment};

/// Campaign with its vote counts
#[derive(Debug, Clone, Serialize)]
pub struct CampaignSummaryResponse {
    pub id: CampaignId,
    pub guild_id: String,
    pub subject_id: String,
    pub target_role_id: String,
    pub status: CampaignStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    /// Closed before the cooldown elapsed
    pub forced: bool,
    pub approvals: usize,
    pub oppositions: usize,
    pub abstentions: usize,
    pub total_votes: usize,
    /// `null` when nobody has voted
    pub approval_percentage: Option<f64>,
    /// Seconds until an unforced close is allowed; 0 once eligible or closed
    pub closable_in_seconds: i64,
}

/// Campaign with every comment
#[derive(Debug, Clone, Serialize)]
pub struct CampaignDetailResponse {
    #[serde(flatten)]
    pub campaign: CampaignSummaryResponse,
    pub comments: Vec<CommentResponse>,
}

/// One member's vote
#[derive(Debug, Clone, Serialize)]
pub struct CommentResponse {
    pub campaign_id: CampaignId,
    pub author_id: String,
    pub sentiment: PromotionSentiment,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
    /// Set on the response to a write
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CommentOutcome>,
}

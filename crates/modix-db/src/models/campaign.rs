//! Promotion campaign database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for promotion_campaigns table
#[derive(Debug, Clone, FromRow)]
pub struct CampaignModel {
    pub id: i64,
    pub guild_id: i64,
    pub subject_id: i64,
    pub target_role_id: i64,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub closed_by: Option<i64>,
    pub closed_at: Option<DateTime<Utc>>,
    pub outcome: Option<String>,
    pub forced: bool,
}

//! Promotion comment database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for promotion_comments table
#[derive(Debug, Clone, FromRow)]
pub struct CommentModel {
    pub campaign_id: i64,
    pub author_id: i64,
    pub sentiment: String,
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in modix-core.
//!
//! Expected tables:
//!
//! - `promotion_campaigns (id BIGSERIAL PRIMARY KEY, guild_id, subject_id, target_role_id,
//!   created_by BIGINT, created_at TIMESTAMPTZ, closed_by BIGINT NULL, closed_at TIMESTAMPTZ NULL,
//!   outcome TEXT NULL, forced BOOLEAN)` with a unique index on `(guild_id, subject_id)
//!   WHERE closed_at IS NULL`
//! - `promotion_comments (campaign_id, author_id, sentiment, body, created_at, modified_at)`
//!   keyed by `(campaign_id, author_id)`

mod campaign;
mod comment;
mod error;

pub use campaign::PgCampaignRepository;
pub use comment::PgCommentRepository;

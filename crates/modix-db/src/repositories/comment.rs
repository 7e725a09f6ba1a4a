//! PostgreSQL implementation of CommentRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use modix_core::entities::{CampaignId, PromotionComment};
use modix_core::error::DomainError;
use modix_core::traits::{CommentRepository, RepoResult};
use modix_core::value_objects::Snowflake;

use crate::mappers::CommentUpsert;
use crate::models::CommentModel;

use super::error::map_db_error;

/// PostgreSQL implementation of CommentRepository
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    /// Create a new PgCommentRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    #[instrument(skip(self))]
    async fn find_by_campaign(&self, campaign_id: CampaignId) -> RepoResult<Vec<PromotionComment>> {
        let rows = sqlx::query_as::<_, CommentModel>(
            r#"
            SELECT campaign_id, author_id, sentiment, body, created_at, modified_at
            FROM promotion_comments
            WHERE campaign_id = $1
            ORDER BY created_at, author_id
            "#,
        )
        .bind(campaign_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(PromotionComment::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn find(
        &self,
        campaign_id: CampaignId,
        author_id: Snowflake,
    ) -> RepoResult<Option<PromotionComment>> {
        let result = sqlx::query_as::<_, CommentModel>(
            r#"
            SELECT campaign_id, author_id, sentiment, body, created_at, modified_at
            FROM promotion_comments
            WHERE campaign_id = $1 AND author_id = $2
            "#,
        )
        .bind(campaign_id.into_inner())
        .bind(author_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(PromotionComment::try_from).transpose()
    }

    #[instrument(skip(self, comment), fields(campaign_id = %comment.campaign_id, author_id = %comment.author_id))]
    async fn upsert(&self, comment: &PromotionComment) -> RepoResult<()> {
        let values = CommentUpsert::new(comment);

        // The share lock makes a concurrent close wait for this write, and a
        // close that committed first filters the campaign row out.
        let result = sqlx::query(
            r#"
            INSERT INTO promotion_comments
                (campaign_id, author_id, sentiment, body, created_at, modified_at)
            SELECT c.id, $2, $3, $4, $5, $6
            FROM promotion_campaigns c
            WHERE c.id = $1 AND c.closed_at IS NULL
            FOR SHARE OF c
            ON CONFLICT (campaign_id, author_id) DO UPDATE
            SET sentiment = EXCLUDED.sentiment,
                body = EXCLUDED.body,
                modified_at = EXCLUDED.modified_at
            "#,
        )
        .bind(values.campaign_id)
        .bind(values.author_id)
        .bind(values.sentiment)
        .bind(values.body)
        .bind(comment.created_at)
        .bind(comment.modified_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM promotion_campaigns WHERE id = $1)",
            )
            .bind(values.campaign_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

            return Err(if exists {
                DomainError::CampaignClosed(comment.campaign_id)
            } else {
                DomainError::CampaignNotFound(comment.campaign_id)
            });
        }

        Ok(())
    }
}

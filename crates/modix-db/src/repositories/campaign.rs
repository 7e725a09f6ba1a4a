//! PostgreSQL implementation of CampaignRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use modix_core::entities::{CampaignId, CampaignStatus, NewCampaign, PromotionCampaign};
use modix_core::error::DomainError;
use modix_core::traits::{CampaignQuery, CampaignRepository, RepoResult};
use modix_core::value_objects::Snowflake;

use crate::mappers::{CampaignClose, CampaignInsert};
use crate::models::CampaignModel;

use super::error::{map_db_error, map_unique_violation};

const CAMPAIGN_COLUMNS: &str = "id, guild_id, subject_id, target_role_id, created_by, created_at, \
     closed_by, closed_at, outcome, forced";

/// PostgreSQL implementation of CampaignRepository
#[derive(Clone)]
pub struct PgCampaignRepository {
    pool: PgPool,
}

impl PgCampaignRepository {
    /// Create a new PgCampaignRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: CampaignId) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM promotion_campaigns WHERE id = $1)",
        )
        .bind(id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}

fn into_entities(rows: Vec<CampaignModel>) -> RepoResult<Vec<PromotionCampaign>> {
    rows.into_iter().map(PromotionCampaign::try_from).collect()
}

#[async_trait]
impl CampaignRepository for PgCampaignRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: CampaignId) -> RepoResult<Option<PromotionCampaign>> {
        let result = sqlx::query_as::<_, CampaignModel>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM promotion_campaigns WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(PromotionCampaign::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_active_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<PromotionCampaign>> {
        let rows = sqlx::query_as::<_, CampaignModel>(&format!(
            r#"
            SELECT {CAMPAIGN_COLUMNS}
            FROM promotion_campaigns
            WHERE guild_id = $1 AND closed_at IS NULL
            ORDER BY created_at, id
            "#
        ))
        .bind(guild_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        into_entities(rows)
    }

    #[instrument(skip(self))]
    async fn find_active_by_subject(
        &self,
        guild_id: Snowflake,
        subject_id: Snowflake,
    ) -> RepoResult<Option<PromotionCampaign>> {
        let result = sqlx::query_as::<_, CampaignModel>(&format!(
            r#"
            SELECT {CAMPAIGN_COLUMNS}
            FROM promotion_campaigns
            WHERE guild_id = $1 AND subject_id = $2 AND closed_at IS NULL
            LIMIT 1
            "#
        ))
        .bind(guild_id.into_inner())
        .bind(subject_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(PromotionCampaign::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn search(
        &self,
        guild_id: Snowflake,
        query: &CampaignQuery,
    ) -> RepoResult<Vec<PromotionCampaign>> {
        let rows = sqlx::query_as::<_, CampaignModel>(&format!(
            r#"
            SELECT {CAMPAIGN_COLUMNS}
            FROM promotion_campaigns
            WHERE guild_id = $1
              AND ($2::BIGINT IS NULL OR subject_id = $2)
              AND ($3::TEXT IS NULL
                   OR ($3 = 'ACTIVE' AND closed_at IS NULL)
                   OR outcome = $3)
            ORDER BY created_at DESC, id DESC
            LIMIT $4
            "#
        ))
        .bind(guild_id.into_inner())
        .bind(query.subject_id.map(Snowflake::into_inner))
        .bind(query.status.as_ref().map(CampaignStatus::as_str))
        .bind(i64::from(query.effective_limit()))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        into_entities(rows)
    }

    #[instrument(skip(self))]
    async fn create(&self, campaign: &NewCampaign) -> RepoResult<PromotionCampaign> {
        let insert = CampaignInsert::new(campaign);

        let row = sqlx::query_as::<_, CampaignModel>(&format!(
            r#"
            INSERT INTO promotion_campaigns
                (guild_id, subject_id, target_role_id, created_by, created_at, forced)
            VALUES ($1, $2, $3, $4, $5, FALSE)
            RETURNING {CAMPAIGN_COLUMNS}
            "#
        ))
        .bind(insert.guild_id)
        .bind(insert.subject_id)
        .bind(insert.target_role_id)
        .bind(insert.created_by)
        .bind(campaign.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || DomainError::CampaignAlreadyActive {
                subject_id: campaign.subject_id,
            })
        })?;

        PromotionCampaign::try_from(row)
    }

    #[instrument(skip(self), fields(campaign_id = %campaign.id))]
    async fn save(&self, campaign: &PromotionCampaign) -> RepoResult<()> {
        // Only the close columns are mutable
        let Some((close, closed_at)) = CampaignClose::new(campaign) else {
            return Ok(());
        };

        let result = sqlx::query(
            r#"
            UPDATE promotion_campaigns
            SET closed_by = $2, closed_at = $3, outcome = $4, forced = $5
            WHERE id = $1 AND closed_at IS NULL
            "#,
        )
        .bind(close.id)
        .bind(close.closed_by)
        .bind(closed_at)
        .bind(close.outcome)
        .bind(close.forced)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(if self.exists(campaign.id).await? {
                DomainError::CampaignAlreadyClosed(campaign.id)
            } else {
                DomainError::CampaignNotFound(campaign.id)
            });
        }

        Ok(())
    }
}

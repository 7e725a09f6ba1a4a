//! Campaign entity <-> model mapper

use modix_core::entities::{
    CampaignCloseAction, CampaignCreateAction, CampaignId, CampaignOutcome, NewCampaign,
    PromotionCampaign,
};
use modix_core::error::DomainError;
use modix_core::value_objects::Snowflake;

use crate::models::CampaignModel;

/// Convert CampaignModel to PromotionCampaign entity
///
/// A row must either carry all close columns or none of them.
impl TryFrom<CampaignModel> for PromotionCampaign {
    type Error = DomainError;

    fn try_from(model: CampaignModel) -> Result<Self, Self::Error> {
        let close_action = match (model.closed_by, model.closed_at, model.outcome.as_deref()) {
            (None, None, None) => None,
            (Some(closed_by), Some(closed_at), Some(raw)) => {
                let outcome = CampaignOutcome::parse(raw).ok_or_else(|| {
                    DomainError::DatabaseError(format!(
                        "campaign {} has unknown outcome {raw:?}",
                        model.id
                    ))
                })?;
                Some(CampaignCloseAction {
                    closed_by: Snowflake::new(closed_by),
                    closed_at,
                    outcome,
                    forced: model.forced,
                })
            }
            _ => {
                return Err(DomainError::DatabaseError(format!(
                    "campaign {} has a partial close record",
                    model.id
                )))
            }
        };

        Ok(PromotionCampaign::restore(
            CampaignId::new(model.id),
            Snowflake::new(model.subject_id),
            Snowflake::new(model.target_role_id),
            CampaignCreateAction {
                guild_id: Snowflake::new(model.guild_id),
                created_by: Snowflake::new(model.created_by),
                created_at: model.created_at,
            },
            close_action,
        ))
    }
}

/// Values for inserting a new campaign
pub struct CampaignInsert {
    pub guild_id: i64,
    pub subject_id: i64,
    pub target_role_id: i64,
    pub created_by: i64,
}

impl CampaignInsert {
    pub fn new(campaign: &NewCampaign) -> Self {
        Self {
            guild_id: campaign.guild_id.into_inner(),
            subject_id: campaign.subject_id.into_inner(),
            target_role_id: campaign.target_role_id.into_inner(),
            created_by: campaign.created_by.into_inner(),
        }
    }
}

/// Values for stamping the close columns of a campaign
pub struct CampaignClose {
    pub id: i64,
    pub closed_by: i64,
    pub outcome: &'static str,
    pub forced: bool,
}

impl CampaignClose {
    /// `None` when the campaign is still active
    pub fn new(campaign: &PromotionCampaign) -> Option<(Self, chrono::DateTime<chrono::Utc>)> {
        campaign.close_action().map(|action| {
            (
                Self {
                    id: campaign.id.into_inner(),
                    closed_by: action.closed_by.into_inner(),
                    outcome: action.outcome.as_str(),
                    forced: action.forced,
                },
                action.closed_at,
            )
        })
    }
}

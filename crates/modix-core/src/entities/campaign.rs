//! Promotion campaign entity - a proposal to grant a member a rank
//!
//! A campaign starts `Active` and moves exactly once to `Approved` or `Denied`.
//! The status is derived from the close action, so an active campaign never
//! carries one and a closed campaign always does.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;
use crate::tally;
use crate::value_objects::Snowflake;

/// Minimum campaign age, in hours, before an unforced close is allowed
pub const DEFAULT_CAMPAIGN_ACCEPT_COOLDOWN_HOURS: i64 = 48;

/// Campaign identifier (assigned by the store)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignId(i64);

impl CampaignId {
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CampaignId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for CampaignId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

/// Campaign status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    Active,
    Approved,
    Denied,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Approved => "APPROVED",
            Self::Denied => "DENIED",
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome chosen when a campaign is closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignOutcome {
    Approved,
    Denied,
}

impl CampaignOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "APPROVED",
            Self::Denied => "DENIED",
        }
    }

    /// Parse the stored string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "APPROVED" => Some(Self::Approved),
            "DENIED" => Some(Self::Denied),
            _ => None,
        }
    }
}

impl From<CampaignOutcome> for CampaignStatus {
    fn from(outcome: CampaignOutcome) -> Self {
        match outcome {
            CampaignOutcome::Approved => CampaignStatus::Approved,
            CampaignOutcome::Denied => CampaignStatus::Denied,
        }
    }
}

impl fmt::Display for CampaignOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who opened the campaign, where, and when
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignCreateAction {
    pub guild_id: Snowflake,
    pub created_by: Snowflake,
    pub created_at: DateTime<Utc>,
}

/// Who closed the campaign, when, and with which outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignCloseAction {
    pub closed_by: Snowflake,
    pub closed_at: DateTime<Utc>,
    pub outcome: CampaignOutcome,
    /// Closed before the cooldown elapsed
    pub forced: bool,
}

/// Input for persisting a new campaign
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCampaign {
    pub guild_id: Snowflake,
    pub subject_id: Snowflake,
    pub target_role_id: Snowflake,
    pub created_by: Snowflake,
    pub created_at: DateTime<Utc>,
}

impl NewCampaign {
    pub fn new(
        guild_id: Snowflake,
        subject_id: Snowflake,
        target_role_id: Snowflake,
        created_by: Snowflake,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            guild_id,
            subject_id,
            target_role_id,
            created_by,
            created_at,
        }
    }
}

/// Parameters of a close transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseRequest {
    pub outcome: CampaignOutcome,
    pub closed_by: Snowflake,
    pub now: DateTime<Utc>,
    /// Bypass the accept cooldown
    pub force: bool,
}

/// Promotion campaign entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionCampaign {
    pub id: CampaignId,
    pub subject_id: Snowflake,
    pub target_role_id: Snowflake,
    pub create_action: CampaignCreateAction,
    close_action: Option<CampaignCloseAction>,
}

impl PromotionCampaign {
    /// A freshly created, active campaign
    pub fn open(id: CampaignId, new: NewCampaign) -> Self {
        Self {
            id,
            subject_id: new.subject_id,
            target_role_id: new.target_role_id,
            create_action: CampaignCreateAction {
                guild_id: new.guild_id,
                created_by: new.created_by,
                created_at: new.created_at,
            },
            close_action: None,
        }
    }

    /// Rebuild a campaign from stored state
    pub fn restore(
        id: CampaignId,
        subject_id: Snowflake,
        target_role_id: Snowflake,
        create_action: CampaignCreateAction,
        close_action: Option<CampaignCloseAction>,
    ) -> Self {
        Self {
            id,
            subject_id,
            target_role_id,
            create_action,
            close_action,
        }
    }

    #[inline]
    pub fn guild_id(&self) -> Snowflake {
        self.create_action.guild_id
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.create_action.created_at
    }

    pub fn status(&self) -> CampaignStatus {
        self.close_action
            .as_ref()
            .map_or(CampaignStatus::Active, |action| action.outcome.into())
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.close_action.is_none()
    }

    pub fn close_action(&self) -> Option<&CampaignCloseAction> {
        self.close_action.as_ref()
    }

    /// Move the campaign to its terminal state
    ///
    /// Fails with `CampaignAlreadyClosed` when the campaign is not active, and
    /// with `CooldownNotElapsed` when an unforced close arrives before the
    /// campaign is `cooldown` old.
    pub fn close(
        &mut self,
        request: CloseRequest,
        cooldown: Duration,
    ) -> Result<&CampaignCloseAction, DomainError> {
        if !self.is_active() {
            return Err(DomainError::CampaignAlreadyClosed(self.id));
        }

        if !request.force {
            let remaining = tally::time_until_closable(self, cooldown, request.now);
            if remaining > Duration::zero() {
                return Err(DomainError::CooldownNotElapsed {
                    campaign_id: self.id,
                    remaining,
                });
            }
        }

        let action = self.close_action.insert(CampaignCloseAction {
            closed_by: request.closed_by,
            closed_at: request.now,
            outcome: request.outcome,
            forced: request.force,
        });
        Ok(&*action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cooldown() -> Duration {
        Duration::hours(DEFAULT_CAMPAIGN_ACCEPT_COOLDOWN_HOURS)
    }

    fn campaign(created_at: DateTime<Utc>) -> PromotionCampaign {
        PromotionCampaign::open(
            CampaignId::new(1),
            NewCampaign::new(
                Snowflake::new(10),
                Snowflake::new(20),
                Snowflake::new(30),
                Snowflake::new(40),
                created_at,
            ),
        )
    }

    fn request(outcome: CampaignOutcome, now: DateTime<Utc>, force: bool) -> CloseRequest {
        CloseRequest {
            outcome,
            closed_by: Snowflake::new(99),
            now,
            force,
        }
    }

    #[test]
    fn test_new_campaign_is_active() {
        let c = campaign(Utc::now());
        assert_eq!(c.status(), CampaignStatus::Active);
        assert!(c.is_active());
        assert!(c.close_action().is_none());
        assert_eq!(c.guild_id(), Snowflake::new(10));
    }

    #[test]
    fn test_unforced_close_before_cooldown_fails() {
        let t0 = Utc::now();
        let mut c = campaign(t0);

        let err = c
            .close(
                request(CampaignOutcome::Approved, t0 + Duration::hours(47), false),
                cooldown(),
            )
            .unwrap_err();

        match err {
            DomainError::CooldownNotElapsed { remaining, .. } => {
                assert_eq!(remaining, Duration::hours(1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(c.is_active());
    }

    #[test]
    fn test_unforced_close_at_cooldown_boundary_succeeds() {
        let t0 = Utc::now();
        let mut c = campaign(t0);

        let action = c
            .close(
                request(CampaignOutcome::Approved, t0 + cooldown(), false),
                cooldown(),
            )
            .unwrap();
        assert!(!action.forced);
        assert_eq!(c.status(), CampaignStatus::Approved);
    }

    #[test]
    fn test_forced_close_bypasses_cooldown() {
        let t0 = Utc::now();
        let mut c = campaign(t0);

        c.close(request(CampaignOutcome::Denied, t0, true), cooldown())
            .unwrap();
        assert_eq!(c.status(), CampaignStatus::Denied);
        assert!(c.close_action().is_some_and(|a| a.forced));
    }

    #[test]
    fn test_close_twice_fails_regardless_of_outcome() {
        let t0 = Utc::now();
        let later = t0 + Duration::hours(72);
        let mut c = campaign(t0);
        c.close(request(CampaignOutcome::Approved, later, false), cooldown())
            .unwrap();

        for outcome in [CampaignOutcome::Approved, CampaignOutcome::Denied] {
            for force in [false, true] {
                let err = c
                    .close(request(outcome, later, force), cooldown())
                    .unwrap_err();
                assert!(matches!(err, DomainError::CampaignAlreadyClosed(_)));
            }
        }
        assert_eq!(c.status(), CampaignStatus::Approved);
    }

    #[test]
    fn test_outcome_parse() {
        assert_eq!(CampaignOutcome::parse("DENIED"), Some(CampaignOutcome::Denied));
        assert_eq!(CampaignOutcome::parse("ACTIVE"), None);
    }
}

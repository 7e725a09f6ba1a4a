//! Authorization claims granted to a guild member
//!
//! Claims are resolved by the host's authorization provider; the promotion core
//! only checks them.

use bitflags::bitflags;
use super::Snowflake;
use crate::error::DomainError;

bitflags! {
    /// Promotion-related claim flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AuthorizationClaims: u64 {
        /// View campaigns and their comments
        const PROMOTIONS_READ                 = 1 << 0;
        /// Open a new campaign
        const PROMOTIONS_CREATE_CAMPAIGN      = 1 << 1;
        /// Comment (vote) on an active campaign
        const PROMOTIONS_COMMENT              = 1 << 2;
        /// Accept or reject a campaign once its cooldown has elapsed
        const PROMOTIONS_CLOSE_CAMPAIGN       = 1 << 3;
        /// Close a campaign before its cooldown has elapsed
        const PROMOTIONS_FORCE_CLOSE_CAMPAIGN = 1 << 4;
        /// Bypass all claim checks
        const ADMINISTRATOR                   = 1 << 63;

        /// Claims held by an ordinary rank-holding member
        const MEMBER = Self::PROMOTIONS_READ.bits() | Self::PROMOTIONS_COMMENT.bits();

        /// Claims held by a staff member allowed to run campaigns
        const STAFF = Self::MEMBER.bits()
            | Self::PROMOTIONS_CREATE_CAMPAIGN.bits()
            | Self::PROMOTIONS_CLOSE_CAMPAIGN.bits();
    }
}

impl AuthorizationClaims {
    /// Check if the claim set grants a required claim
    ///
    /// Administrators pass every check.
    #[inline]
    pub fn has(&self, claim: AuthorizationClaims) -> bool {
        self.contains(Self::ADMINISTRATOR) || self.contains(claim)
    }

    /// Names of the individual claims that are set
    pub fn list(&self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }

    /// Display name of a single claim, for error messages
    pub fn name(claim: AuthorizationClaims) -> String {
        let names: Vec<_> = claim.iter_names().map(|(name, _)| name).collect();
        if names.is_empty() {
            format!("{:#x}", claim.bits())
        } else {
            names.join("|")
        }
    }
}

/// A guild member whose identity and claims have been resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
    pub claims: AuthorizationClaims,
}

impl AuthenticatedUser {
    pub fn new(guild_id: Snowflake, user_id: Snowflake, claims: AuthorizationClaims) -> Self {
        Self {
            guild_id,
            user_id,
            claims,
        }
    }

    /// Fail with `MissingClaim` unless the user holds `claim`
    pub fn require(&self, claim: AuthorizationClaims) -> Result<(), DomainError> {
        if self.claims.has(claim) {
            Ok(())
        } else {
            Err(DomainError::MissingClaim(AuthorizationClaims::name(claim)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_claims() {
        let member = AuthorizationClaims::MEMBER;
        assert!(member.has(AuthorizationClaims::PROMOTIONS_COMMENT));
        assert!(member.has(AuthorizationClaims::PROMOTIONS_READ));
        assert!(!member.has(AuthorizationClaims::PROMOTIONS_CREATE_CAMPAIGN));
    }

    #[test]
    fn test_staff_cannot_force_close() {
        let staff = AuthorizationClaims::STAFF;
        assert!(staff.has(AuthorizationClaims::PROMOTIONS_CLOSE_CAMPAIGN));
        assert!(!staff.has(AuthorizationClaims::PROMOTIONS_FORCE_CLOSE_CAMPAIGN));
    }

    #[test]
    fn test_administrator_bypass() {
        let admin = AuthorizationClaims::ADMINISTRATOR;
        assert!(admin.has(AuthorizationClaims::PROMOTIONS_FORCE_CLOSE_CAMPAIGN));
        assert!(admin.has(AuthorizationClaims::PROMOTIONS_CREATE_CAMPAIGN));
    }

    #[test]
    fn test_list() {
        let claims =
            AuthorizationClaims::PROMOTIONS_READ | AuthorizationClaims::PROMOTIONS_COMMENT;
        let names = claims.list();
        assert!(names.contains(&"PROMOTIONS_READ"));
        assert!(names.contains(&"PROMOTIONS_COMMENT"));
    }

    #[test]
    fn test_require_reports_missing_claim() {
        let user = AuthenticatedUser::new(
            Snowflake::new(1),
            Snowflake::new(2),
            AuthorizationClaims::MEMBER,
        );
        assert!(user.require(AuthorizationClaims::PROMOTIONS_COMMENT).is_ok());

        let err = user
            .require(AuthorizationClaims::PROMOTIONS_FORCE_CLOSE_CAMPAIGN)
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::MissingClaim(ref name) if name == "PROMOTIONS_FORCE_CLOSE_CAMPAIGN"
        ));
    }
}

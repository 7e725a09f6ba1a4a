//! Domain errors - error types for the promotion domain

use chrono::Duration;
use thiserror::Error;

use crate::entities::CampaignId;
use crate::tally::format_remaining;
use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Campaign not found: {0}")]
    CampaignNotFound(CampaignId),

    #[error("No comment by {author_id} on campaign {campaign_id}")]
    CommentNotFound {
        campaign_id: CampaignId,
        author_id: Snowflake,
    },

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Missing claim: {0}")]
    MissingClaim(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Campaign {0} has already been closed")]
    CampaignAlreadyClosed(CampaignId),

    #[error("An active campaign already exists for {subject_id}")]
    CampaignAlreadyActive { subject_id: Snowflake },

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Campaign {0} is closed and no longer accepts comments")]
    CampaignClosed(CampaignId),

    #[error(
        "Campaign {campaign_id} cannot be closed for another {}",
        format_remaining(.remaining)
    )]
    CooldownNotElapsed {
        campaign_id: CampaignId,
        remaining: Duration,
    },

    #[error("Cannot comment on your own campaign")]
    CannotCommentOnOwnCampaign,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Messaging error: {0}")]
    MessagingError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get a stable error code string
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::CampaignNotFound(_) => "UNKNOWN_CAMPAIGN",
            Self::CommentNotFound { .. } => "UNKNOWN_COMMENT",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",

            // Authorization
            Self::AuthenticationFailed(_) => "AUTHENTICATION_FAILED",
            Self::MissingClaim(_) => "MISSING_CLAIM",

            // Conflict
            Self::CampaignAlreadyClosed(_) => "CAMPAIGN_ALREADY_CLOSED",
            Self::CampaignAlreadyActive { .. } => "CAMPAIGN_ALREADY_ACTIVE",

            // Business Rules
            Self::CampaignClosed(_) => "CAMPAIGN_CLOSED",
            Self::CooldownNotElapsed { .. } => "COOLDOWN_NOT_ELAPSED",
            Self::CannotCommentOnOwnCampaign => "CANNOT_COMMENT_ON_OWN_CAMPAIGN",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::MessagingError(_) => "MESSAGING_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CampaignNotFound(_) | Self::CommentNotFound { .. }
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_) | Self::ContentTooLong { .. })
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed(_) | Self::MissingClaim(_)
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::CampaignAlreadyClosed(_) | Self::CampaignAlreadyActive { .. }
        )
    }

    /// Check if this is a lifecycle rule violation
    pub fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            Self::CampaignClosed(_)
                | Self::CooldownNotElapsed { .. }
                | Self::CannotCommentOnOwnCampaign
        )
    }

    /// Check if this wraps a collaborator failure
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_) | Self::MessagingError(_) | Self::InternalError(_)
        )
    }
}

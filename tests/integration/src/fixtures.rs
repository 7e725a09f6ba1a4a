//! Test fixtures and data generators
//!
//! Provides reusable IDs, actors and requests for integration tests.

use chrono::{DateTime, TimeZone, Utc};

use modix_core::{AuthenticatedUser, AuthorizationClaims, Snowflake};
use modix_service::dto::CreateCampaignRequest;

pub const GUILD_ID: Snowflake = Snowflake::new(81_384_788_765_712_384);
pub const DIALOG_CHANNEL: Snowflake = Snowflake::new(81_384_788_765_712_400);
pub const SECOND_DIALOG_CHANNEL: Snowflake = Snowflake::new(81_384_788_765_712_401);

pub const STAFF_ID: Snowflake = Snowflake::new(100);
pub const MODERATOR_ID: Snowflake = Snowflake::new(101);
pub const MEMBER_ID: Snowflake = Snowflake::new(200);
pub const OTHER_MEMBER_ID: Snowflake = Snowflake::new(201);
pub const SUBJECT_ID: Snowflake = Snowflake::new(300);
pub const ROLE_ID: Snowflake = Snowflake::new(900);

/// Wall-clock start for every test bot
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Staff member allowed to open and close campaigns
pub fn staff() -> AuthenticatedUser {
    AuthenticatedUser::new(GUILD_ID, STAFF_ID, AuthorizationClaims::STAFF)
}

/// Staff member who may also close before the cooldown
pub fn moderator() -> AuthenticatedUser {
    AuthenticatedUser::new(
        GUILD_ID,
        MODERATOR_ID,
        AuthorizationClaims::STAFF | AuthorizationClaims::PROMOTIONS_FORCE_CLOSE_CAMPAIGN,
    )
}

pub fn member(user_id: Snowflake) -> AuthenticatedUser {
    AuthenticatedUser::new(GUILD_ID, user_id, AuthorizationClaims::MEMBER)
}

pub fn create_request(subject_id: Snowflake) -> CreateCampaignRequest {
    CreateCampaignRequest {
        subject_id,
        target_role_id: ROLE_ID,
        comment: "Consistently helpful in support channels".to_string(),
    }
}

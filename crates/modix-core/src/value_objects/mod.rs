//! Value objects - immutable types with no identity of their own

mod claims;
mod sentiment;
mod snowflake;

pub use claims::{AuthenticatedUser, AuthorizationClaims};
pub use sentiment::{PromotionSentiment, SentimentParseError};
pub use snowflake::{Snowflake, SnowflakeParseError};

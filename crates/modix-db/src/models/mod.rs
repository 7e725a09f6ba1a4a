//! Database models - SQLx-compatible structs for PostgreSQL tables

mod campaign;
mod comment;

pub use campaign::CampaignModel;
pub use comment::CommentModel;

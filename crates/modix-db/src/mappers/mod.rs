//! Entity to model mappers
//!
//! - `TryFrom<Model> for Entity`: convert database rows to domain objects,
//!   rejecting rows that break entity invariants
//! - `*Insert`/`*Close` structs: prepare entity data for database writes

mod campaign;
mod comment;

pub use campaign::{CampaignClose, CampaignInsert};
pub use comment::CommentUpsert;

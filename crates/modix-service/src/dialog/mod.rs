//! Dialog synchronization
//!
//! Chat messages that mirror active campaigns and collect votes through
//! reactions.

mod behavior;
mod cache;
pub mod emoji;
pub mod render;

pub use behavior::{PromotionDialogBehavior, ReconcileReport};
pub use cache::{DialogCache, DialogEntry};

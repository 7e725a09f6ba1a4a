//! Business logic services
//!
//! Services borrow a [`ServiceContext`] and orchestrate domain operations
//! against the repositories and collaborators it holds.

pub mod context;
pub mod error;
pub mod promotion;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use promotion::PromotionService;

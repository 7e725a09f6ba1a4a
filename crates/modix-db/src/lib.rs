//! # modix-db
//!
//! Persistence layer implementing the campaign and comment repository traits.
//!
//! ## Overview
//!
//! - PostgreSQL repositories via SQLx (`PgCampaignRepository`, `PgCommentRepository`)
//! - Database models with SQLx `FromRow` derives and entity ↔ model mappers
//! - `InMemoryPromotionStore`, a process-local store for hosts without a database
//!
//! Both backends enforce the same write guards: a campaign is only closed while it
//! is still active, and comments are only written to active campaigns.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use modix_db::{create_pool, DatabaseConfig, PgCampaignRepository};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::from_env()).await?;
//!     let campaigns = PgCampaignRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::InMemoryPromotionStore;
pub use pool::{create_pool, create_pool_from_env, DatabaseConfig, PgPool};
pub use repositories::{PgCampaignRepository, PgCommentRepository};

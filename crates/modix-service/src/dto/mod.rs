//! Data transfer objects for promotion requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for host inputs
//! - Response DTOs for serializing campaign state
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{CloseCampaignRequest, CommentRequest, CreateCampaignRequest};

pub use responses::{CampaignDetailResponse, CampaignSummaryResponse, CommentResponse};

pub use mappers::CampaignWithTally;

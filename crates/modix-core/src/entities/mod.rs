//! Domain entities

mod campaign;
mod comment;
mod dialog;

pub use campaign::{
    CampaignCloseAction, CampaignCreateAction, CampaignId, CampaignOutcome, CampaignStatus,
    CloseRequest, NewCampaign, PromotionCampaign, DEFAULT_CAMPAIGN_ACCEPT_COOLDOWN_HOURS,
};
pub use comment::{CommentOutcome, CommentResult, PromotionComment, MAX_COMMENT_LENGTH};
pub use dialog::{DialogLocation, PostedMessage};

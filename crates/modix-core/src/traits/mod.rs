//! Ports - interfaces the promotion core needs from the outside world

mod clock;
mod collaborators;
mod repositories;

pub use clock::{Clock, SystemClock};
pub use collaborators::{
    AuthorizationProvider, ChannelDesignation, DesignatedChannelLookup, MessageLookup,
    MessagingClient,
};
pub use repositories::{CampaignQuery, CampaignRepository, CommentRepository, RepoResult};

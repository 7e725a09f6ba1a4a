//! Campaign aggregation - vote counts, approval ratio, and cooldown math
//!
//! Everything here is a pure function of a campaign and its comments.
//! Abstentions are left out of both sides of the approval ratio.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::entities::{PromotionCampaign, PromotionComment};
use crate::value_objects::PromotionSentiment;

/// Vote counts for one campaign
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CampaignTally {
    pub approvals: usize,
    pub oppositions: usize,
    pub abstentions: usize,
}

impl CampaignTally {
    pub fn from_comments<'a, I>(comments: I) -> Self
    where
        I: IntoIterator<Item = &'a PromotionComment>,
    {
        comments
            .into_iter()
            .fold(Self::default(), |mut tally, comment| {
                match comment.sentiment {
                    PromotionSentiment::Approve => tally.approvals += 1,
                    PromotionSentiment::Oppose => tally.oppositions += 1,
                    PromotionSentiment::Abstain => tally.abstentions += 1,
                }
                tally
            })
    }

    /// Approvals plus oppositions
    #[inline]
    pub fn total_votes(&self) -> usize {
        self.approvals + self.oppositions
    }

    /// `approvals / total_votes`, or `None` when nobody has voted
    pub fn approval_percentage(&self) -> Option<f64> {
        match self.total_votes() {
            0 => None,
            total => Some(self.approvals as f64 / total as f64),
        }
    }
}

/// Count of comments that are not abstentions
pub fn total_votes(comments: &[PromotionComment]) -> usize {
    comments
        .iter()
        .filter(|c| c.sentiment.counts_as_vote())
        .count()
}

pub fn number_of_approvals(comments: &[PromotionComment]) -> usize {
    count_sentiment(comments, PromotionSentiment::Approve)
}

pub fn number_of_oppositions(comments: &[PromotionComment]) -> usize {
    count_sentiment(comments, PromotionSentiment::Oppose)
}

/// Share of votes that approve; `None` when there are no votes
pub fn approval_percentage(comments: &[PromotionComment]) -> Option<f64> {
    CampaignTally::from_comments(comments).approval_percentage()
}

/// `created + cooldown - now`; positive means an unforced close is not yet allowed
///
/// A cooldown that runs past the representable calendar saturates to
/// `Duration::MAX`.
pub fn time_until_closable(
    campaign: &PromotionCampaign,
    cooldown: Duration,
    now: DateTime<Utc>,
) -> Duration {
    campaign
        .created_at()
        .checked_add_signed(cooldown)
        .map_or(Duration::MAX, |closable_at| closable_at - now)
}

pub fn can_be_closed(campaign: &PromotionCampaign, cooldown: Duration, now: DateTime<Utc>) -> bool {
    time_until_closable(campaign, cooldown, now) <= Duration::zero()
}

/// Render a remaining cooldown as `1d 2h 3m`, rounding up to the next minute
pub fn format_remaining(remaining: &Duration) -> String {
    let total_minutes = (remaining.num_seconds().max(0) + 59) / 60;
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 || parts.is_empty() {
        parts.push(format!("{minutes}m"));
    }
    parts.join(" ")
}

fn count_sentiment(comments: &[PromotionComment], sentiment: PromotionSentiment) -> usize {
    comments.iter().filter(|c| c.sentiment == sentiment).count()
}

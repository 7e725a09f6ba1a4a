//! Dialog message content
//!
//! The last line of every dialog is a marker carrying the campaign ID so the
//! message can be matched back to its campaign after a restart.

use chrono::Duration;
use std::fmt::Write;

use modix_core::{format_remaining, CampaignId, CampaignTally, PromotionCampaign};

use super::emoji::{ABSTAIN_EMOJI, APPROVE_EMOJI, OPPOSE_EMOJI};

pub const MARKER_PREFIX: &str = "Campaign ID: ";

/// Render the full dialog for an active campaign
///
/// `notice` is a one-off line shown above the marker, used to report a
/// rejected vote back to the member.
pub fn render_dialog(
    campaign: &PromotionCampaign,
    tally: &CampaignTally,
    closable_in: Duration,
    notice: Option<&str>,
) -> String {
    let mut out = String::with_capacity(512);

    let _ = writeln!(
        out,
        "**Promotion campaign** for {} to {}",
        campaign.subject_id.user_mention(),
        campaign.target_role_id.role_mention()
    );
    let _ = writeln!(
        out,
        "Opened by {} <t:{}:R>",
        campaign.create_action.created_by.user_mention(),
        campaign.created_at().timestamp()
    );
    out.push('\n');

    let _ = writeln!(
        out,
        "{APPROVE_EMOJI} {}  {OPPOSE_EMOJI} {}  {ABSTAIN_EMOJI} {}",
        tally.approvals, tally.oppositions, tally.abstentions
    );
    match tally.approval_percentage() {
        Some(ratio) => {
            let _ = writeln!(
                out,
                "Approval: {:.0}% of {} votes",
                ratio * 100.0,
                tally.total_votes()
            );
        }
        None => out.push_str("Approval: no votes yet\n"),
    }
    if closable_in > Duration::zero() {
        let _ = writeln!(out, "Can be closed in {}", format_remaining(&closable_in));
    } else {
        out.push_str("Ready to be closed\n");
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "React with {APPROVE_EMOJI} {OPPOSE_EMOJI} or {ABSTAIN_EMOJI} to vote. Your reaction is removed once it is counted."
    );
    if let Some(notice) = notice {
        let _ = writeln!(out, "> {notice}");
    }

    let _ = write!(out, "{MARKER_PREFIX}{}", campaign.id);
    out
}

/// Campaign ID from a dialog's marker line, if the content carries one
pub fn parse_campaign_marker(content: &str) -> Option<CampaignId> {
    content
        .lines()
        .rev()
        .find_map(|line| line.trim().strip_prefix(MARKER_PREFIX))
        .and_then(|id| id.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use modix_core::{NewCampaign, Snowflake};

    fn campaign() -> PromotionCampaign {
        PromotionCampaign::open(
            CampaignId::new(12),
            NewCampaign::new(
                Snowflake::new(1),
                Snowflake::new(200),
                Snowflake::new(300),
                Snowflake::new(400),
                Utc::now(),
            ),
        )
    }

    #[test]
    fn test_render_with_votes() {
        let tally = CampaignTally {
            approvals: 3,
            oppositions: 1,
            abstentions: 2,
        };
        let content = render_dialog(&campaign(), &tally, Duration::hours(26), None);

        assert!(content.contains("<@200> to <@&300>"));
        assert!(content.contains("Opened by <@400>"));
        assert!(content.contains("👍 3  👎 1  🤷 2"));
        assert!(content.contains("Approval: 75% of 4 votes"));
        assert!(content.contains("Can be closed in 1d 2h"));
        assert!(content.ends_with("Campaign ID: 12"));
    }

    #[test]
    fn test_render_without_votes() {
        let content = render_dialog(&campaign(), &CampaignTally::default(), Duration::zero(), None);
        assert!(content.contains("Approval: no votes yet"));
        assert!(content.contains("Ready to be closed"));
    }

    #[test]
    fn test_render_notice() {
        let content = render_dialog(
            &campaign(),
            &CampaignTally::default(),
            Duration::zero(),
            Some("You cannot comment on your own campaign"),
        );
        assert!(content.contains("> You cannot comment on your own campaign\nCampaign ID: 12"));
    }

    #[test]
    fn test_marker_round_trip() {
        let content = render_dialog(&campaign(), &CampaignTally::default(), Duration::zero(), None);
        assert_eq!(parse_campaign_marker(&content), Some(CampaignId::new(12)));
    }

    #[test]
    fn test_marker_absent_or_malformed() {
        assert_eq!(parse_campaign_marker("hello there"), None);
        assert_eq!(parse_campaign_marker("Campaign ID: soon"), None);
        assert_eq!(parse_campaign_marker(""), None);
    }
}

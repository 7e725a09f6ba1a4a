//! Vote reactions
//!
//! The three emoji seeded on every dialog message and the sentiment each one
//! casts.

use modix_core::PromotionSentiment;

pub const APPROVE_EMOJI: &str = "👍";
pub const OPPOSE_EMOJI: &str = "👎";
pub const ABSTAIN_EMOJI: &str = "🤷";

/// Reactions added to a freshly posted dialog, in display order
pub const VOTE_EMOJI: [&str; 3] = [APPROVE_EMOJI, OPPOSE_EMOJI, ABSTAIN_EMOJI];

/// Sentiment cast by a reaction, or `None` for any other emoji
pub fn sentiment_for(emoji: &str) -> Option<PromotionSentiment> {
    // Clients may append a variation selector, a gender or a skin tone
    let base = emoji
        .trim_end_matches('\u{fe0f}')
        .trim_end_matches(['\u{2640}', '\u{2642}'])
        .trim_end_matches('\u{200d}')
        .trim_end_matches(is_skin_tone);
    match base {
        APPROVE_EMOJI => Some(PromotionSentiment::Approve),
        OPPOSE_EMOJI => Some(PromotionSentiment::Oppose),
        ABSTAIN_EMOJI => Some(PromotionSentiment::Abstain),
        _ => None,
    }
}

fn is_skin_tone(c: char) -> bool {
    ('\u{1f3fb}'..='\u{1f3ff}').contains(&c)
}

pub fn emoji_for(sentiment: PromotionSentiment) -> &'static str {
    match sentiment {
        PromotionSentiment::Approve => APPROVE_EMOJI,
        PromotionSentiment::Oppose => OPPOSE_EMOJI,
        PromotionSentiment::Abstain => ABSTAIN_EMOJI,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_emoji_map_to_sentiments() {
        for sentiment in PromotionSentiment::ALL {
            assert_eq!(sentiment_for(emoji_for(sentiment)), Some(sentiment));
        }
    }

    #[test]
    fn test_modified_emoji() {
        assert_eq!(sentiment_for("🤷\u{200d}\u{2642}\u{fe0f}"), Some(PromotionSentiment::Abstain));
        assert_eq!(sentiment_for("👍\u{fe0f}"), Some(PromotionSentiment::Approve));
    }

    #[test]
    fn test_skin_toned_emoji() {
        assert_eq!(sentiment_for("👍🏽"), Some(PromotionSentiment::Approve));
        assert_eq!(sentiment_for("👎🏿"), Some(PromotionSentiment::Oppose));
        assert_eq!(
            sentiment_for("🤷🏻\u{200d}\u{2640}\u{fe0f}"),
            Some(PromotionSentiment::Abstain)
        );
        assert_eq!(sentiment_for("🏽"), None);
    }

    #[test]
    fn test_other_emoji_are_ignored() {
        assert_eq!(sentiment_for("🎉"), None);
        assert_eq!(sentiment_for(""), None);
        assert_eq!(sentiment_for("thumbsup"), None);
    }
}

//! Promotion sentiment - a member's stance toward a campaign

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentiment attached to a promotion comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionSentiment {
    Approve,
    Oppose,
    Abstain,
}

impl PromotionSentiment {
    pub const ALL: [PromotionSentiment; 3] = [Self::Approve, Self::Oppose, Self::Abstain];

    /// Stable string form used for storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "APPROVE",
            Self::Oppose => "OPPOSE",
            Self::Abstain => "ABSTAIN",
        }
    }

    /// Parse the stored string form (case-insensitive)
    pub fn parse(s: &str) -> Result<Self, SentimentParseError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "APPROVE" => Ok(Self::Approve),
            "OPPOSE" => Ok(Self::Oppose),
            "ABSTAIN" => Ok(Self::Abstain),
            _ => Err(SentimentParseError(s.to_string())),
        }
    }

    /// Abstentions are excluded from both sides of the approval ratio
    #[inline]
    pub fn counts_as_vote(&self) -> bool {
        !matches!(self, Self::Abstain)
    }
}

impl fmt::Display for PromotionSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing a sentiment from its stored form
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown promotion sentiment: {0}")]
pub struct SentimentParseError(pub String);

impl std::str::FromStr for PromotionSentiment {
    type Err = SentimentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_storage_form() {
        for sentiment in PromotionSentiment::ALL {
            assert_eq!(PromotionSentiment::parse(sentiment.as_str()), Ok(sentiment));
        }
        assert_eq!(
            PromotionSentiment::parse("approve"),
            Ok(PromotionSentiment::Approve)
        );
        assert!(PromotionSentiment::parse("maybe").is_err());
    }

    #[test]
    fn test_abstain_is_not_a_vote() {
        assert!(PromotionSentiment::Approve.counts_as_vote());
        assert!(PromotionSentiment::Oppose.counts_as_vote());
        assert!(!PromotionSentiment::Abstain.counts_as_vote());
    }

    #[test]
    fn test_serde_form() {
        let json = serde_json::to_string(&PromotionSentiment::Oppose).unwrap();
        assert_eq!(json, "\"OPPOSE\"");
    }
}

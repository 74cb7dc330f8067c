//! Best-effort extraction of a verdict from the model's free-text reply.
//!
//! Both heuristics are naive: a reply that echoes a number before
//! the score, or that rephrases the relation ("concerns Ukraine"), produces a
//! wrong verdict. Neither ever fails; a malformed reply degrades to score 0 and
//! "not related".

use crate::constants::REGION_MARKER;

/// What the model said about one article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub score: u32,
    pub region_related: bool,
    pub reply: String,
}

impl Assessment {
    pub fn from_reply(reply: impl Into<String>) -> Self {
        let reply = reply.into();
        Self {
            score: extract_score(&reply),
            region_related: is_region_related(&reply),
            reply,
        }
    }
}

/// First integer literal anywhere in `reply`, or 0 when there is none.
///
/// Digit runs too long for `u32` saturate to `u32::MAX`.
pub fn extract_score(reply: &str) -> u32 {
    let Some(start) = reply.find(|c: char| c.is_ascii_digit()) else {
        return 0;
    };
    let digits: &str = {
        let rest = &reply[start..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    digits.parse().unwrap_or(u32::MAX)
}

/// Case-insensitive search for the region marker phrase.
pub fn is_region_related(reply: &str) -> bool {
    reply.to_lowercase().contains(REGION_MARKER)
}

use crate::constants::{DEFAULT_PROMOTION_CAP, PROMOTION_THRESHOLD};
use crate::sheets::ArticleStatus;

use super::parse::Assessment;

/// Thresholds that turn an [`Assessment`] into a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionPolicy {
    /// Scores at or above this are promoted.
    pub promotion_threshold: u32,
    /// Promotions allowed per run; `None` means unlimited.
    pub promotion_cap: Option<u32>,
    /// Related articles scoring below this are rejected; `None` disables the floor.
    pub min_score: Option<u32>,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            promotion_threshold: PROMOTION_THRESHOLD,
            promotion_cap: Some(DEFAULT_PROMOTION_CAP),
            min_score: None,
        }
    }
}

/// Outcome of the decision rules, with the reason attached for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    NotRelated,
    BelowFloor,
    Promoted,
    /// Qualified for promotion but the per-run cap was already reached.
    PromotionCapped,
    Kept,
}

impl Verdict {
    pub fn status(&self) -> ArticleStatus {
        match self {
            Verdict::NotRelated | Verdict::BelowFloor => ArticleStatus::Rejected,
            Verdict::Promoted => ArticleStatus::Facebook,
            Verdict::PromotionCapped | Verdict::Kept => ArticleStatus::Unpublished,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::NotRelated => "not_related",
            Verdict::BelowFloor => "below_floor",
            Verdict::Promoted => "promoted",
            Verdict::PromotionCapped => "promotion_capped",
            Verdict::Kept => "kept",
        }
    }
}

/// Applies the rules in priority order: relation, floor, promotion (with cap), keep.
pub fn decide(assessment: &Assessment, policy: &DecisionPolicy, promoted_so_far: u32) -> Verdict {
    if !assessment.region_related {
        return Verdict::NotRelated;
    }

    if policy.min_score.is_some_and(|floor| assessment.score < floor) {
        return Verdict::BelowFloor;
    }

    if assessment.score >= policy.promotion_threshold {
        return match policy.promotion_cap {
            Some(cap) if promoted_so_far >= cap => Verdict::PromotionCapped,
            _ => Verdict::Promoted,
        };
    }

    Verdict::Kept
}

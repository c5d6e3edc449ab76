use super::super::domain::UrgencyTier;
use super::config::ScoringRubric;

pub const CASE_SPECIFIC_CONSULTATION: &str = "consultation-case-specific";
pub const EXPLORATORY_CONSULTATION: &str = "consultation-exploratory";

pub(crate) fn tier_for(total: u8, rubric: &ScoringRubric) -> UrgencyTier {
    if total >= rubric.immediate_threshold {
        UrgencyTier::Immediate
    } else if total >= rubric.strong_threshold {
        UrgencyTier::Strong
    } else {
        UrgencyTier::Strengthen
    }
}

/// Service slug offered to each tier; the booking flow keys its catalog on these.
pub const fn recommended_service(tier: UrgencyTier) -> &'static str {
    match tier {
        UrgencyTier::Immediate => CASE_SPECIFIC_CONSULTATION,
        UrgencyTier::Strong | UrgencyTier::Strengthen => EXPLORATORY_CONSULTATION,
    }
}

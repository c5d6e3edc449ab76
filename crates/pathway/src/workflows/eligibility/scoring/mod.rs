mod config;
mod policy;
mod rules;

pub use config::ScoringRubric;
pub use policy::{recommended_service, CASE_SPECIFIC_CONSULTATION, EXPLORATORY_CONSULTATION};

use super::domain::{AssessmentAnswers, ScoreSignal, UrgencyTier};
use serde::{Deserialize, Serialize};

/// Stateless scorer applying the rubric to an answer set.
#[derive(Debug, Clone, Default)]
pub struct EligibilityScorer {
    rubric: ScoringRubric,
}

impl EligibilityScorer {
    pub fn new(rubric: ScoringRubric) -> Self {
        Self { rubric }
    }

    pub fn rubric(&self) -> &ScoringRubric {
        &self.rubric
    }

    pub fn score(&self, answers: &AssessmentAnswers) -> AssessmentResult {
        let (components, total_score) = rules::score_answers(answers, &self.rubric);
        let urgency = policy::tier_for(total_score, &self.rubric);

        AssessmentResult {
            urgency,
            recommended_service: recommended_service(urgency).to_string(),
            total_score,
            components,
        }
    }
}

/// Points awarded for a single signal, kept for audit trails and admin review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub signal: ScoreSignal,
    pub points: u8,
    pub notes: String,
}

/// Scorer output: tier, recommended service and the breakdown behind them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub urgency: UrgencyTier,
    pub recommended_service: String,
    pub total_score: u8,
    pub components: Vec<ScoreComponent>,
}

impl AssessmentResult {
    pub fn title(&self) -> &'static str {
        self.urgency.title()
    }

    pub fn description(&self) -> &'static str {
        self.urgency.description()
    }
}

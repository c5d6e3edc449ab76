use serde::{Deserialize, Serialize};

/// Point weights and tier thresholds for the eligibility rubric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRubric {
    pub job_offer_points: u8,
    pub experience_points: u8,
    pub minimum_experience_years: i64,
    pub education_points: u8,
    pub language_points: u8,
    pub timeline_points: u8,
    pub immediate_threshold: u8,
    pub strong_threshold: u8,
}

impl Default for ScoringRubric {
    fn default() -> Self {
        Self {
            job_offer_points: 30,
            experience_points: 25,
            minimum_experience_years: 3,
            education_points: 20,
            language_points: 15,
            timeline_points: 10,
            immediate_threshold: 60,
            strong_threshold: 30,
        }
    }
}

impl ScoringRubric {
    pub fn maximum_score(&self) -> u8 {
        self.job_offer_points
            .saturating_add(self.experience_points)
            .saturating_add(self.education_points)
            .saturating_add(self.language_points)
            .saturating_add(self.timeline_points)
    }
}

//! Eligibility questionnaire: answer model, additive scoring and persisted results.

pub mod domain;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    AssessmentAnswers, AssessmentId, AssessmentRecord, EducationLevel, EnglishLevel,
    ImmigrationGoal, ScoreSignal, Timeline, UrgencyTier, YesNo,
};
pub use repository::AssessmentRepository;
pub use router::{assessment_router, AssessmentResultView, AssessmentSummaryView};
pub use scoring::{
    recommended_service, AssessmentResult, EligibilityScorer, ScoreComponent, ScoringRubric,
    CASE_SPECIFIC_CONSULTATION, EXPLORATORY_CONSULTATION,
};
pub use service::{AssessmentService, AssessmentServiceError, StoredAssessment};
pub use validation::{validate_answers, AnswerValidationError};

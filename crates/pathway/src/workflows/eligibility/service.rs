use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{AssessmentAnswers, AssessmentId, AssessmentRecord};
use super::repository::AssessmentRepository;
use super::scoring::{AssessmentResult, EligibilityScorer, ScoringRubric};
use super::validation::{validate_answers, AnswerValidationError};
use crate::workflows::identity::{CurrentUser, Profile, ProfileRepository, UserId};
use crate::workflows::repository::{IdSequence, RepositoryError};

static ASSESSMENT_SEQUENCE: IdSequence = IdSequence::new("asm");

/// Service composing validation, the scorer and assessment storage.
pub struct AssessmentService<R, P> {
    scorer: EligibilityScorer,
    assessments: Arc<R>,
    profiles: Arc<P>,
}

impl<R, P> AssessmentService<R, P>
where
    R: AssessmentRepository + 'static,
    P: ProfileRepository + 'static,
{
    pub fn new(assessments: Arc<R>, profiles: Arc<P>, rubric: ScoringRubric) -> Self {
        Self {
            scorer: EligibilityScorer::new(rubric),
            assessments,
            profiles,
        }
    }

    pub fn scorer(&self) -> &EligibilityScorer {
        &self.scorer
    }

    /// Score without persisting, for visitors who have not signed in yet.
    pub fn preview(&self, answers: &AssessmentAnswers) -> AssessmentResult {
        self.scorer.score(answers)
    }

    /// Validate, score and store a submission, then read it back as the current assessment.
    pub fn submit(
        &self,
        user: &CurrentUser,
        answers: AssessmentAnswers,
    ) -> Result<StoredAssessment, AssessmentServiceError> {
        validate_answers(&answers)?;

        let result = self.scorer.score(&answers);
        let now = Utc::now();
        let profile = profile_from_answers(user, &answers, now);

        let record = AssessmentRecord {
            id: AssessmentId(ASSESSMENT_SEQUENCE.next_id()),
            user_id: user.id.clone(),
            answers,
            urgency: result.urgency,
            recommended_service: result.recommended_service.clone(),
            total_score: result.total_score,
            created_at: now,
        };

        let inserted = self.assessments.insert(record)?;
        info!(
            user_id = %user.id.0,
            assessment_id = %inserted.id.0,
            urgency = inserted.urgency.label(),
            "assessment stored"
        );

        self.profiles.upsert(profile).map_err(|err| {
            warn!(user_id = %user.id.0, error = %err, "profile upsert failed");
            err
        })?;

        let current = self
            .assessments
            .latest_for_user(&user.id)?
            .ok_or(RepositoryError::NotFound)?;

        Ok(StoredAssessment {
            record: current,
            result,
        })
    }

    pub fn latest(&self, user_id: &UserId) -> Result<Option<AssessmentRecord>, AssessmentServiceError> {
        Ok(self.assessments.latest_for_user(user_id)?)
    }
}

fn profile_from_answers(
    user: &CurrentUser,
    answers: &AssessmentAnswers,
    now: chrono::DateTime<Utc>,
) -> Profile {
    let non_blank = |value: &str| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    };

    Profile {
        user_id: user.id.clone(),
        email: user.email.clone(),
        first_name: non_blank(&answers.first_name),
        last_name: non_blank(&answers.last_name),
        phone: non_blank(&answers.phone),
        created_at: now,
        updated_at: now,
    }
}

/// A persisted assessment together with the scorer breakdown that produced it.
#[derive(Debug, Clone)]
pub struct StoredAssessment {
    pub record: AssessmentRecord,
    pub result: AssessmentResult,
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Validation(#[from] AnswerValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use super::domain::{AssessmentAnswers, AssessmentId, AssessmentRecord, UrgencyTier};
use super::repository::AssessmentRepository;
use super::scoring::{AssessmentResult, ScoreComponent};
use super::service::{AssessmentService, AssessmentServiceError};
use crate::workflows::http::{error_response, require_caller};
use crate::workflows::identity::{IdentityProvider, ProfileRepository};

/// Shared state for the assessment endpoints.
pub struct AssessmentRouterState<R, P> {
    pub service: Arc<AssessmentService<R, P>>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl<R, P> Clone for AssessmentRouterState<R, P> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            identity: self.identity.clone(),
        }
    }
}

/// Router builder exposing scoring, submission and the caller's current result.
pub fn assessment_router<R, P>(
    service: Arc<AssessmentService<R, P>>,
    identity: Arc<dyn IdentityProvider>,
) -> Router
where
    R: AssessmentRepository + 'static,
    P: ProfileRepository + 'static,
{
    Router::new()
        .route("/api/v1/assessments/score", post(score_handler::<R, P>))
        .route("/api/v1/assessments", post(submit_handler::<R, P>))
        .route("/api/v1/assessments/latest", get(latest_handler::<R, P>))
        .with_state(AssessmentRouterState { service, identity })
}

/// Result as shown on the completion screen.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentResultView {
    pub urgency: UrgencyTier,
    pub title: &'static str,
    pub description: &'static str,
    pub recommended_service: String,
    pub total_score: u8,
    pub components: Vec<ScoreComponent>,
}

impl From<AssessmentResult> for AssessmentResultView {
    fn from(result: AssessmentResult) -> Self {
        Self {
            urgency: result.urgency,
            title: result.title(),
            description: result.description(),
            recommended_service: result.recommended_service,
            total_score: result.total_score,
            components: result.components,
        }
    }
}

/// Stored assessment summary returned to its owner.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentSummaryView {
    pub assessment_id: AssessmentId,
    pub urgency: UrgencyTier,
    pub title: &'static str,
    pub recommended_service: String,
    pub total_score: u8,
    pub created_at: DateTime<Utc>,
}

impl From<&AssessmentRecord> for AssessmentSummaryView {
    fn from(record: &AssessmentRecord) -> Self {
        Self {
            assessment_id: record.id.clone(),
            urgency: record.urgency,
            title: record.urgency.title(),
            recommended_service: record.recommended_service.clone(),
            total_score: record.total_score,
            created_at: record.created_at,
        }
    }
}

pub(crate) async fn score_handler<R, P>(
    State(state): State<AssessmentRouterState<R, P>>,
    axum::Json(answers): axum::Json<AssessmentAnswers>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: ProfileRepository + 'static,
{
    let result = state.service.preview(&answers);
    (StatusCode::OK, axum::Json(AssessmentResultView::from(result))).into_response()
}

pub(crate) async fn submit_handler<R, P>(
    State(state): State<AssessmentRouterState<R, P>>,
    headers: HeaderMap,
    axum::Json(answers): axum::Json<AssessmentAnswers>,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: ProfileRepository + 'static,
{
    let user = match require_caller(state.identity.as_ref(), &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.submit(&user, answers) {
        Ok(stored) => {
            let payload = json!({
                "assessment": AssessmentSummaryView::from(&stored.record),
                "result": AssessmentResultView::from(stored.result),
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(AssessmentServiceError::Validation(error)) => {
            let payload = json!({
                "error": error.to_string(),
                "fields": error.fields(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => {
            tracing::error!(user_id = %user.id.0, error = %other, "assessment submission failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

pub(crate) async fn latest_handler<R, P>(
    State(state): State<AssessmentRouterState<R, P>>,
    headers: HeaderMap,
) -> Response
where
    R: AssessmentRepository + 'static,
    P: ProfileRepository + 'static,
{
    let user = match require_caller(state.identity.as_ref(), &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.latest(&user.id) {
        Ok(Some(record)) => (
            StatusCode::OK,
            axum::Json(AssessmentSummaryView::from(&record)),
        )
            .into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "no assessment on file"),
        Err(other) => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde_json::json;

use super::service::{AdminError, AdminService};
use crate::workflows::contact::ContactMessageId;
use crate::workflows::eligibility::{AssessmentId, AssessmentSummaryView};
use crate::workflows::http::{error_response, require_caller};
use crate::workflows::identity::{CurrentUser, IdentityProvider};
use crate::workflows::repository::RepositoryError;

#[derive(Clone)]
pub struct AdminRouterState {
    pub service: Arc<AdminService>,
    pub identity: Arc<dyn IdentityProvider>,
}

pub fn admin_router(service: Arc<AdminService>, identity: Arc<dyn IdentityProvider>) -> Router {
    Router::new()
        .route("/api/v1/admin/assessments", get(assessments_handler))
        .route("/api/v1/admin/assessments.csv", get(assessments_csv_handler))
        .route(
            "/api/v1/admin/assessments/:id",
            delete(delete_assessment_handler),
        )
        .route("/api/v1/admin/bookings", get(bookings_handler))
        .route("/api/v1/admin/users", get(users_handler))
        .route("/api/v1/admin/contact", get(contact_handler))
        .route(
            "/api/v1/admin/contact/:id/read",
            post(mark_contact_read_handler),
        )
        .route("/api/v1/admin/contact/:id", delete(delete_contact_handler))
        .with_state(AdminRouterState { service, identity })
}

/// 401 for signed-out callers, 403 for signed-in non-admins.
fn require_admin(state: &AdminRouterState, headers: &HeaderMap) -> Result<CurrentUser, Response> {
    let user = require_caller(state.identity.as_ref(), headers)?;
    state
        .service
        .authorize(&user)
        .map_err(admin_error_response)?;
    Ok(user)
}

fn admin_error_response(error: AdminError) -> Response {
    let status = match &error {
        AdminError::Forbidden => StatusCode::FORBIDDEN,
        AdminError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AdminError::Repository(_) | AdminError::Export(_) => {
            tracing::error!(error = %error, "admin request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(status, error.to_string())
}

fn respond<T: serde::Serialize>(result: Result<T, AdminError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, axum::Json(body)).into_response(),
        Err(error) => admin_error_response(error),
    }
}

pub(crate) async fn assessments_handler(
    State(state): State<AdminRouterState>,
    headers: HeaderMap,
) -> Response {
    let admin = match require_admin(&state, &headers) {
        Ok(admin) => admin,
        Err(response) => return response,
    };
    respond(state.service.assessments(&admin).map(|records| {
        let rows: Vec<_> = records
            .iter()
            .map(|record| {
                json!({
                    "summary": AssessmentSummaryView::from(record),
                    "user_id": record.user_id,
                    "answers": record.answers,
                })
            })
            .collect();
        json!({ "assessments": rows })
    }))
}

pub(crate) async fn assessments_csv_handler(
    State(state): State<AdminRouterState>,
    headers: HeaderMap,
) -> Response {
    let admin = match require_admin(&state, &headers) {
        Ok(admin) => admin,
        Err(response) => return response,
    };
    match state.service.assessments_csv(&admin) {
        Ok(csv) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"assessments.csv\"",
                ),
            ],
            csv,
        )
            .into_response(),
        Err(error) => admin_error_response(error),
    }
}

pub(crate) async fn delete_assessment_handler(
    State(state): State<AdminRouterState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let admin = match require_admin(&state, &headers) {
        Ok(admin) => admin,
        Err(response) => return response,
    };
    match state.service.delete_assessment(&admin, &AssessmentId(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => admin_error_response(error),
    }
}

pub(crate) async fn bookings_handler(
    State(state): State<AdminRouterState>,
    headers: HeaderMap,
) -> Response {
    let admin = match require_admin(&state, &headers) {
        Ok(admin) => admin,
        Err(response) => return response,
    };
    respond(state.service.bookings(&admin))
}

pub(crate) async fn users_handler(
    State(state): State<AdminRouterState>,
    headers: HeaderMap,
) -> Response {
    let admin = match require_admin(&state, &headers) {
        Ok(admin) => admin,
        Err(response) => return response,
    };
    respond(
        state
            .service
            .users(&admin)
            .map(|profiles| json!({ "users": profiles })),
    )
}

pub(crate) async fn contact_handler(
    State(state): State<AdminRouterState>,
    headers: HeaderMap,
) -> Response {
    let admin = match require_admin(&state, &headers) {
        Ok(admin) => admin,
        Err(response) => return response,
    };
    respond(
        state
            .service
            .contact_messages(&admin)
            .map(|messages| json!({ "messages": messages })),
    )
}

pub(crate) async fn mark_contact_read_handler(
    State(state): State<AdminRouterState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let admin = match require_admin(&state, &headers) {
        Ok(admin) => admin,
        Err(response) => return response,
    };
    respond(
        state
            .service
            .mark_contact_read(&admin, &ContactMessageId(id)),
    )
}

pub(crate) async fn delete_contact_handler(
    State(state): State<AdminRouterState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let admin = match require_admin(&state, &headers) {
        Ok(admin) => admin,
        Err(response) => return response,
    };
    match state.service.delete_contact(&admin, &ContactMessageId(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => admin_error_response(error),
    }
}

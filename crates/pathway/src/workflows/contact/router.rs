use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::domain::ContactSubmission;
use super::repository::ContactRepository;
use super::service::{ContactService, ContactServiceError};
use crate::workflows::http::error_response;

/// Public contact form endpoint; no sign-in needed.
pub fn contact_router<R>(service: Arc<ContactService<R>>) -> Router
where
    R: ContactRepository + 'static,
{
    Router::new()
        .route("/api/v1/contact", post(submit_handler::<R>))
        .with_state(service)
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<ContactService<R>>>,
    axum::Json(submission): axum::Json<ContactSubmission>,
) -> Response
where
    R: ContactRepository + 'static,
{
    match service.submit(submission) {
        Ok(message) => (
            StatusCode::CREATED,
            axum::Json(json!({ "message_id": message.id, "status": message.status })),
        )
            .into_response(),
        Err(ContactServiceError::MissingFields(fields)) => {
            let payload = json!({
                "error": format!("missing required field(s): {}", fields.join(", ")),
                "fields": fields,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => {
            tracing::error!(error = %other, "contact submission failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

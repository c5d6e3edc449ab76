use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::identity::{resolve_caller, CurrentUser, IdentityError, IdentityProvider};

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({ "error": message.into() });
    (status, Json(payload)).into_response()
}

pub(crate) fn identity_failure(error: &IdentityError) -> Response {
    tracing::warn!(error = %error, "identity lookup failed");
    error_response(StatusCode::BAD_GATEWAY, error.to_string())
}

/// Resolve the caller or produce the 401/502 response the handler should return.
pub(crate) fn require_caller(
    identity: &dyn IdentityProvider,
    headers: &HeaderMap,
) -> Result<CurrentUser, Response> {
    match resolve_caller(identity, headers) {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(error_response(
            StatusCode::UNAUTHORIZED,
            "sign in required",
        )),
        Err(err) => Err(identity_failure(&err)),
    }
}

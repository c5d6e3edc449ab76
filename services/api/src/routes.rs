use crate::infra::{AppState, Stores};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use pathway::config::AppConfig;
use pathway::workflows::admin::{admin_router, AdminDirectory, AdminService};
use pathway::workflows::booking::{
    booking_router, BookingService, ServiceCatalog, WebhookVerifier,
};
use pathway::workflows::contact::{contact_router, ContactService};
use pathway::workflows::eligibility::{assessment_router, AssessmentService, ScoringRubric};
use pathway::workflows::identity::{IdentityProvider, SignedSessionProvider};
use serde_json::json;
use std::sync::Arc;

/// Every workflow router plus the operational endpoints.
pub(crate) fn with_pathway_routes(config: &AppConfig, stores: &Stores) -> axum::Router {
    let identity: Arc<dyn IdentityProvider> = Arc::new(SignedSessionProvider::new(
        &config.identity.session_secret,
    ));

    let assessments = Arc::new(AssessmentService::new(
        stores.assessments.clone(),
        stores.profiles.clone(),
        ScoringRubric::default(),
    ));
    let bookings = Arc::new(BookingService::new(
        ServiceCatalog::standard(),
        config.payments.currency.clone(),
        stores.assessments.clone(),
        stores.bookings.clone(),
        stores.payments.clone(),
    ));
    let webhook = config
        .payments
        .webhook_secret
        .as_ref()
        .map(WebhookVerifier::new);
    let contact = Arc::new(ContactService::new(stores.contacts.clone()));
    let admin = Arc::new(AdminService::new(
        AdminDirectory::new(&config.identity.admin_emails),
        stores.assessments.clone(),
        stores.bookings.clone(),
        stores.profiles.clone(),
        stores.contacts.clone(),
    ));

    assessment_router(assessments, identity.clone())
        .merge(booking_router(bookings, identity.clone(), webhook))
        .merge(contact_router(contact))
        .merge(admin_router(admin, identity))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

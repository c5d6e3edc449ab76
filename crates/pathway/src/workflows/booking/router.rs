use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde_json::json;

use super::catalog::ServiceOffering;
use super::gate::{GateBlock, GateOutcome};
use super::payments::{PaymentConfirmation, PaymentError, PaymentProcessor};
use super::repository::BookingRepository;
use super::service::{BookingService, BookingServiceError, ScheduleConfirmation};
use super::webhook::{PaymentEvent, WebhookVerifier, SIGNATURE_HEADER};
use crate::workflows::eligibility::AssessmentRepository;
use crate::workflows::http::{error_response, require_caller};
use crate::workflows::identity::{resolve_caller, IdentityProvider};

/// Shared state for the catalog, gate, payment and webhook endpoints.
pub struct BookingRouterState<A, B, P> {
    pub service: Arc<BookingService<A, B, P>>,
    pub identity: Arc<dyn IdentityProvider>,
    /// `None` until a webhook secret is configured; the webhook route then refuses events.
    pub webhook: Option<Arc<WebhookVerifier>>,
}

impl<A, B, P> Clone for BookingRouterState<A, B, P> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            identity: self.identity.clone(),
            webhook: self.webhook.clone(),
        }
    }
}

pub fn booking_router<A, B, P>(
    service: Arc<BookingService<A, B, P>>,
    identity: Arc<dyn IdentityProvider>,
    webhook: Option<WebhookVerifier>,
) -> Router
where
    A: AssessmentRepository + 'static,
    B: BookingRepository + 'static,
    P: PaymentProcessor + 'static,
{
    Router::new()
        .route("/api/v1/services", get(services_handler::<A, B, P>))
        .route(
            "/api/v1/bookings/:service/gate",
            get(gate_handler::<A, B, P>),
        )
        .route(
            "/api/v1/bookings/:service/payment",
            post(start_payment_handler::<A, B, P>),
        )
        .route(
            "/api/v1/bookings/:service/payment/confirm",
            post(confirm_payment_handler::<A, B, P>),
        )
        .route(
            "/api/v1/bookings/:service/schedule",
            post(schedule_handler::<A, B, P>),
        )
        .route(
            "/api/v1/payments/webhook",
            post(webhook_handler::<A, B, P>),
        )
        .with_state(BookingRouterState {
            service,
            identity,
            webhook: webhook.map(Arc::new),
        })
}

pub(crate) fn booking_error_response(error: BookingServiceError) -> Response {
    let status = match &error {
        BookingServiceError::AssessmentRequired
        | BookingServiceError::AlreadyPaid(_)
        | BookingServiceError::NotPaid(_)
        | BookingServiceError::IntentMismatch
        | BookingServiceError::Transition(_) => StatusCode::CONFLICT,
        BookingServiceError::NoBooking(_) => StatusCode::NOT_FOUND,
        BookingServiceError::PaymentIncomplete(_) => StatusCode::PAYMENT_REQUIRED,
        BookingServiceError::Payment(PaymentError::Rejected(_)) => StatusCode::PAYMENT_REQUIRED,
        BookingServiceError::Payment(PaymentError::UnknownIntent(_)) => StatusCode::CONFLICT,
        BookingServiceError::Payment(PaymentError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
        BookingServiceError::Repository(_) => {
            tracing::error!(error = %error, "booking storage failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(status, error.to_string())
}

pub(crate) async fn services_handler<A, B, P>(
    State(state): State<BookingRouterState<A, B, P>>,
) -> Response
where
    A: AssessmentRepository + 'static,
    B: BookingRepository + 'static,
    P: PaymentProcessor + 'static,
{
    let offerings: Vec<ServiceOffering> = state.service.catalog().offerings().to_vec();
    (StatusCode::OK, axum::Json(json!({ "services": offerings }))).into_response()
}

pub(crate) async fn gate_handler<A, B, P>(
    State(state): State<BookingRouterState<A, B, P>>,
    Path(service): Path<String>,
    headers: HeaderMap,
) -> Response
where
    A: AssessmentRepository + 'static,
    B: BookingRepository + 'static,
    P: PaymentProcessor + 'static,
{
    let caller = resolve_caller(state.identity.as_ref(), &headers);
    let report = state.service.gate(&caller, &service);
    let status = match report.outcome {
        GateOutcome::Blocked(GateBlock::Error { .. }) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    (status, axum::Json(report)).into_response()
}

pub(crate) async fn start_payment_handler<A, B, P>(
    State(state): State<BookingRouterState<A, B, P>>,
    Path(service): Path<String>,
    headers: HeaderMap,
) -> Response
where
    A: AssessmentRepository + 'static,
    B: BookingRepository + 'static,
    P: PaymentProcessor + 'static,
{
    let user = match require_caller(state.identity.as_ref(), &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.start_payment(&user, &service) {
        Ok(session) => {
            let payload = json!({
                "booking": session.booking,
                "payment_intent_id": session.intent.id,
                "client_secret": session.intent.client_secret,
                "gate": session.report,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => booking_error_response(error),
    }
}

pub(crate) async fn confirm_payment_handler<A, B, P>(
    State(state): State<BookingRouterState<A, B, P>>,
    Path(service): Path<String>,
    headers: HeaderMap,
    axum::Json(confirmation): axum::Json<PaymentConfirmation>,
) -> Response
where
    A: AssessmentRepository + 'static,
    B: BookingRepository + 'static,
    P: PaymentProcessor + 'static,
{
    let user = match require_caller(state.identity.as_ref(), &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.confirm_payment(&user, &service, confirmation) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => booking_error_response(error),
    }
}

pub(crate) async fn schedule_handler<A, B, P>(
    State(state): State<BookingRouterState<A, B, P>>,
    Path(service): Path<String>,
    headers: HeaderMap,
    axum::Json(schedule): axum::Json<ScheduleConfirmation>,
) -> Response
where
    A: AssessmentRepository + 'static,
    B: BookingRepository + 'static,
    P: PaymentProcessor + 'static,
{
    let user = match require_caller(state.identity.as_ref(), &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.service.record_schedule(&user, &service, schedule) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => booking_error_response(error),
    }
}

pub(crate) async fn webhook_handler<A, B, P>(
    State(state): State<BookingRouterState<A, B, P>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    A: AssessmentRepository + 'static,
    B: BookingRepository + 'static,
    P: PaymentProcessor + 'static,
{
    let Some(verifier) = state.webhook.as_ref() else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "payment webhook is not configured",
        );
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if let Err(error) = verifier.verify(signature, &body, Utc::now()) {
        tracing::warn!(error = %error, "rejected payment webhook");
        return error_response(StatusCode::BAD_REQUEST, error.to_string());
    }

    let event = match PaymentEvent::parse(&body) {
        Ok(event) => event,
        Err(error) => return error_response(StatusCode::BAD_REQUEST, error.to_string()),
    };

    match state.service.apply_payment_event(&event) {
        Ok(booking) => {
            let payload = json!({
                "received": true,
                "booking_id": booking.map(|row| row.id),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => booking_error_response(error),
    }
}

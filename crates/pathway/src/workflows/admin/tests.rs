use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, TimeZone, Utc};
use tower::ServiceExt;

use super::{admin_router, AdminDirectory, AdminError, AdminService, BookingLedger};
use crate::workflows::booking::{Booking, BookingId, BookingRepository, PaymentStatus};
use crate::workflows::contact::{
    ContactMessage, ContactMessageId, ContactRepository, ContactStatus,
};
use crate::workflows::eligibility::{
    AssessmentAnswers, AssessmentId, AssessmentRecord, AssessmentRepository, UrgencyTier,
};
use crate::workflows::identity::{
    CurrentUser, IdentityError, IdentityProvider, Profile, ProfileRepository, UserId,
};
use crate::workflows::repository::RepositoryError;

const ADMIN_TOKEN: &str = "token-admin";
const VISITOR_TOKEN: &str = "token-visitor";

fn admin() -> CurrentUser {
    CurrentUser {
        id: UserId("user-admin".to_string()),
        email: "Owner@Pathway.example".to_string(),
        full_name: None,
    }
}

fn visitor() -> CurrentUser {
    CurrentUser {
        id: UserId("user-visitor".to_string()),
        email: "visitor@example.com".to_string(),
        full_name: None,
    }
}

struct Tokens;

impl IdentityProvider for Tokens {
    fn resolve(&self, token: &str) -> Result<Option<CurrentUser>, IdentityError> {
        Ok(match token {
            ADMIN_TOKEN => Some(admin()),
            VISITOR_TOKEN => Some(visitor()),
            _ => None,
        })
    }
}

#[derive(Default)]
struct Store {
    assessments: Mutex<Vec<AssessmentRecord>>,
    bookings: Mutex<Vec<Booking>>,
    messages: Mutex<Vec<ContactMessage>>,
}

impl AssessmentRepository for Store {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        self.assessments.lock().unwrap().push(record.clone());
        Ok(record)
    }

    fn latest_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Ok(self
            .assessments
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|record| &record.user_id == user_id)
            .cloned())
    }

    fn list(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let mut rows = self.assessments.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    fn delete(&self, id: &AssessmentId) -> Result<(), RepositoryError> {
        let mut rows = self.assessments.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| &row.id != id);
        if rows.len() == before {
            Err(RepositoryError::NotFound)
        } else {
            Ok(())
        }
    }
}

impl BookingRepository for Store {
    fn insert(&self, booking: Booking) -> Result<Booking, RepositoryError> {
        let mut rows = self.bookings.lock().unwrap();
        if rows
            .iter()
            .any(|row| row.user_id == booking.user_id && row.service_type == booking.service_type)
        {
            return Err(RepositoryError::Conflict);
        }
        rows.push(booking.clone());
        Ok(booking)
    }

    fn update(&self, booking: Booking) -> Result<Booking, RepositoryError> {
        Ok(booking)
    }

    fn latest_for(
        &self,
        _user_id: &UserId,
        _service_type: &str,
    ) -> Result<Option<Booking>, RepositoryError> {
        Ok(None)
    }

    fn find_by_intent(&self, _payment_intent_id: &str) -> Result<Option<Booking>, RepositoryError> {
        Ok(None)
    }

    fn list(&self) -> Result<Vec<Booking>, RepositoryError> {
        Ok(self.bookings.lock().unwrap().clone())
    }
}

impl ProfileRepository for Store {
    fn upsert(&self, profile: Profile) -> Result<Profile, RepositoryError> {
        Ok(profile)
    }

    fn list(&self) -> Result<Vec<Profile>, RepositoryError> {
        Ok(Vec::new())
    }
}

impl ContactRepository for Store {
    fn insert(&self, message: ContactMessage) -> Result<ContactMessage, RepositoryError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(message)
    }

    fn list(&self) -> Result<Vec<ContactMessage>, RepositoryError> {
        Ok(self.messages.lock().unwrap().clone())
    }

    fn set_status(
        &self,
        id: &ContactMessageId,
        status: ContactStatus,
    ) -> Result<ContactMessage, RepositoryError> {
        let mut rows = self.messages.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or(RepositoryError::NotFound)?;
        row.status = status;
        Ok(row.clone())
    }

    fn delete(&self, id: &ContactMessageId) -> Result<(), RepositoryError> {
        self.messages.lock().unwrap().retain(|row| &row.id != id);
        Ok(())
    }
}

fn booking(id: &str, status: PaymentStatus, amount_cents: u64, currency: &str) -> Booking {
    let created = Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap();
    Booking {
        id: BookingId(id.to_string()),
        user_id: visitor().id,
        service_type: "consultation-exploratory".to_string(),
        amount_cents,
        currency: currency.to_string(),
        payment_status: status,
        payment_intent_id: None,
        scheduled_at: None,
        scheduling_event_id: None,
        assessment_id: None,
        created_at: created,
        updated_at: created,
    }
}

fn seeded() -> (Arc<Store>, AdminService) {
    let store = Arc::new(Store::default());
    let base = Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap();
    for (index, last_name) in ["First", "Second"].iter().enumerate() {
        AssessmentRepository::insert(
            store.as_ref(),
            AssessmentRecord {
                id: AssessmentId(format!("asm-{index}")),
                user_id: visitor().id,
                answers: AssessmentAnswers {
                    first_name: "Ana".to_string(),
                    last_name: last_name.to_string(),
                    ..AssessmentAnswers::default()
                },
                urgency: UrgencyTier::Strong,
                recommended_service: "consultation-exploratory".to_string(),
                total_score: 40,
                created_at: base + Duration::minutes(index as i64),
            },
        )
        .expect("seeded");
    }
    ContactRepository::insert(
        store.as_ref(),
        ContactMessage {
            id: ContactMessageId("msg-1".to_string()),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            message: "Hello".to_string(),
            status: ContactStatus::Unread,
            created_at: base,
        },
    )
    .expect("seeded");

    let service = AdminService::new(
        AdminDirectory::new(["owner@pathway.example"]),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    );
    (store, service)
}

fn router() -> (Arc<Store>, Router) {
    let (store, service) = seeded();
    (store, admin_router(Arc::new(service), Arc::new(Tokens)))
}

fn request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request builds")
}

#[test]
fn revenue_counts_only_paid_bookings_per_currency() {
    let ledger = BookingLedger::from_bookings(vec![
        booking("b1", PaymentStatus::Paid, 15_000, "CAD"),
        booking("b2", PaymentStatus::Paid, 25_000, "CAD"),
        booking("b3", PaymentStatus::Pending, 35_000, "CAD"),
        booking("b4", PaymentStatus::Failed, 20_000, "CAD"),
        booking("b5", PaymentStatus::Paid, 10_000, "USD"),
    ]);

    assert_eq!(ledger.paid, 3);
    assert_eq!(ledger.pending, 1);
    assert_eq!(ledger.failed, 1);
    assert_eq!(ledger.revenue.len(), 2);
    assert_eq!(ledger.revenue[0].currency, "CAD");
    assert_eq!(ledger.revenue[0].amount_cents, 40_000);
    assert_eq!(ledger.revenue[0].bookings, 2);
    assert_eq!(ledger.revenue[1].amount_cents, 10_000);
}

#[test]
fn non_admins_are_forbidden() {
    let (_, service) = seeded();
    assert!(matches!(
        service.assessments(&visitor()),
        Err(AdminError::Forbidden)
    ));
    assert_eq!(service.assessments(&admin()).expect("listed").len(), 2);
}

#[tokio::test]
async fn admin_routes_distinguish_signed_out_and_forbidden() {
    let (_, router) = router();

    let response = router
        .clone()
        .oneshot(request("GET", "/api/v1/admin/users", None))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = router
        .clone()
        .oneshot(request("GET", "/api/v1/admin/users", Some(VISITOR_TOKEN)))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = router
        .oneshot(request("GET", "/api/v1/admin/users", Some(ADMIN_TOKEN)))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn csv_export_lists_newest_first() {
    let (_, router) = router();
    let response = router
        .oneshot(request(
            "GET",
            "/api/v1/admin/assessments.csv",
            Some(ADMIN_TOKEN),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv; charset=utf-8"
    );
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body readable");
    let text = String::from_utf8(body.to_vec()).expect("utf-8");
    let rows: Vec<&str> = text.lines().collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[1].starts_with("asm-1,"));
    assert!(rows[2].starts_with("asm-0,"));
}

#[tokio::test]
async fn delete_and_mark_read_routes() {
    let (store, router) = router();

    let response = router
        .clone()
        .oneshot(request(
            "DELETE",
            "/api/v1/admin/assessments/asm-0",
            Some(ADMIN_TOKEN),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(store.assessments.lock().unwrap().len(), 1);

    let response = router
        .clone()
        .oneshot(request(
            "DELETE",
            "/api/v1/admin/assessments/asm-missing",
            Some(ADMIN_TOKEN),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router
        .oneshot(request(
            "POST",
            "/api/v1/admin/contact/msg-1/read",
            Some(ADMIN_TOKEN),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        store.messages.lock().unwrap()[0].status,
        ContactStatus::Read
    );
}

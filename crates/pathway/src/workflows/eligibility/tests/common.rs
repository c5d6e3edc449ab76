use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use axum::Router;
use serde_json::Value;

use crate::workflows::eligibility::domain::{
    AssessmentAnswers, AssessmentId, AssessmentRecord, EducationLevel, EnglishLevel, Timeline,
    YesNo,
};
use crate::workflows::eligibility::{assessment_router, AssessmentRepository, AssessmentService};
use crate::workflows::eligibility::ScoringRubric;
use crate::workflows::identity::{
    CurrentUser, IdentityError, IdentityProvider, Profile, ProfileRepository, UserId,
};
use crate::workflows::repository::RepositoryError;

pub(super) const TOKEN: &str = "token-ana";

pub(super) fn user() -> CurrentUser {
    CurrentUser {
        id: UserId("user-ana".to_string()),
        email: "ana@example.com".to_string(),
        full_name: Some("Ana Silva".to_string()),
    }
}

pub(super) fn personal_answers() -> AssessmentAnswers {
    AssessmentAnswers {
        first_name: "Ana".to_string(),
        last_name: "Silva".to_string(),
        email: "ana@example.com".to_string(),
        phone: "+1 555 0100".to_string(),
        date_of_birth: "1990-04-12".to_string(),
        home_country: "Brazil".to_string(),
        ..AssessmentAnswers::default()
    }
}

pub(super) fn full_marks_answers() -> AssessmentAnswers {
    AssessmentAnswers {
        has_job_offer: Some(YesNo::Yes),
        years_of_experience: "6".to_string(),
        education_level: Some(EducationLevel::Masters),
        english_level: Some(EnglishLevel::Fluent),
        timeline: Some(Timeline::Immediate),
        ..personal_answers()
    }
}

pub(super) fn zero_point_answers() -> AssessmentAnswers {
    AssessmentAnswers {
        has_job_offer: Some(YesNo::No),
        years_of_experience: "1".to_string(),
        education_level: Some(EducationLevel::Bachelors),
        english_level: Some(EnglishLevel::Intermediate),
        timeline: Some(Timeline::Exploring),
        ..personal_answers()
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAssessments {
    pub(super) records: Arc<Mutex<Vec<AssessmentRecord>>>,
}

impl MemoryAssessments {
    pub(super) fn count(&self) -> usize {
        self.records.lock().expect("lock poisoned").len()
    }
}

impl AssessmentRepository for MemoryAssessments {
    fn insert(&self, record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        let mut records = self.records.lock().expect("lock poisoned");
        if records.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        records.push(record.clone());
        Ok(record)
    }

    fn latest_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<AssessmentRecord>, RepositoryError> {
        let records = self.records.lock().expect("lock poisoned");
        Ok(records
            .iter()
            .filter(|record| &record.user_id == user_id)
            .fold(None::<&AssessmentRecord>, |latest, record| match latest {
                Some(current) if current.created_at > record.created_at => Some(current),
                _ => Some(record),
            })
            .cloned())
    }

    fn list(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        let mut records = self.records.lock().expect("lock poisoned").clone();
        records.reverse();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    fn delete(&self, id: &AssessmentId) -> Result<(), RepositoryError> {
        let mut records = self.records.lock().expect("lock poisoned");
        let before = records.len();
        records.retain(|record| &record.id != id);
        if records.len() == before {
            Err(RepositoryError::NotFound)
        } else {
            Ok(())
        }
    }
}

pub(super) struct UnavailableAssessments;

impl AssessmentRepository for UnavailableAssessments {
    fn insert(&self, _record: AssessmentRecord) -> Result<AssessmentRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn latest_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<AssessmentRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: &AssessmentId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryProfiles {
    pub(super) profiles: Arc<Mutex<BTreeMap<UserId, Profile>>>,
}

impl MemoryProfiles {
    pub(super) fn get(&self, user_id: &UserId) -> Option<Profile> {
        self.profiles
            .lock()
            .expect("lock poisoned")
            .get(user_id)
            .cloned()
    }
}

impl ProfileRepository for MemoryProfiles {
    fn upsert(&self, profile: Profile) -> Result<Profile, RepositoryError> {
        let mut profiles = self.profiles.lock().expect("lock poisoned");
        let stored = match profiles.get(&profile.user_id) {
            Some(existing) => existing.merged_with(profile),
            None => profile,
        };
        profiles.insert(stored.user_id.clone(), stored.clone());
        Ok(stored)
    }

    fn list(&self) -> Result<Vec<Profile>, RepositoryError> {
        let mut profiles: Vec<Profile> = self
            .profiles
            .lock()
            .expect("lock poisoned")
            .values()
            .cloned()
            .collect();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(profiles)
    }
}

pub(super) struct FailingProfiles;

impl ProfileRepository for FailingProfiles {
    fn upsert(&self, _profile: Profile) -> Result<Profile, RepositoryError> {
        Err(RepositoryError::Unavailable("profiles offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Profile>, RepositoryError> {
        Err(RepositoryError::Unavailable("profiles offline".to_string()))
    }
}

/// Resolves [`TOKEN`] to [`user`]; every other token is signed out.
pub(super) struct StaticIdentity;

impl IdentityProvider for StaticIdentity {
    fn resolve(&self, token: &str) -> Result<Option<CurrentUser>, IdentityError> {
        Ok((token == TOKEN).then(user))
    }
}

pub(super) fn build_service() -> (
    AssessmentService<MemoryAssessments, MemoryProfiles>,
    MemoryAssessments,
    MemoryProfiles,
) {
    let assessments = MemoryAssessments::default();
    let profiles = MemoryProfiles::default();
    let service = AssessmentService::new(
        Arc::new(assessments.clone()),
        Arc::new(profiles.clone()),
        ScoringRubric::default(),
    );
    (service, assessments, profiles)
}

pub(super) fn router_with_service(
    service: AssessmentService<MemoryAssessments, MemoryProfiles>,
) -> Router {
    assessment_router(Arc::new(service), Arc::new(StaticIdentity))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body readable");
    serde_json::from_slice(&body).expect("json body")
}

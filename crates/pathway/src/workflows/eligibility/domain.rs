use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::workflows::identity::UserId;

/// Identifier wrapper for persisted assessments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssessmentId(pub String);

/// Raw questionnaire answers as collected by the four-step wizard.
///
/// Enumerated answers are optional: a blank selection deserializes to `None` and never
/// earns points. Personal fields are only checked for presence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssessmentAnswers {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    pub home_country: String,
    #[serde(deserialize_with = "blank_as_none")]
    pub is_citizen: Option<YesNo>,
    pub years_of_experience: String,
    #[serde(deserialize_with = "blank_as_none")]
    pub has_job_offer: Option<YesNo>,
    #[serde(deserialize_with = "blank_as_none")]
    pub education_level: Option<EducationLevel>,
    #[serde(deserialize_with = "blank_as_none")]
    pub english_level: Option<EnglishLevel>,
    pub preferred_country: String,
    #[serde(deserialize_with = "blank_as_none")]
    pub immigration_goal: Option<ImmigrationGoal>,
    #[serde(deserialize_with = "blank_as_none")]
    pub timeline: Option<Timeline>,
    pub additional_info: String,
}

impl AssessmentAnswers {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    pub fn preferred_country_or_default(&self) -> &str {
        match self.preferred_country.trim() {
            "" => "Canada",
            country => country,
        }
    }
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => {
            T::deserialize(serde_json::Value::String(value.to_string()))
                .map(Some)
                .map_err(serde::de::Error::custom)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EducationLevel {
    Highschool,
    Diploma,
    Bachelors,
    Masters,
    Phd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnglishLevel {
    Basic,
    Intermediate,
    Advanced,
    Fluent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImmigrationGoal {
    PermanentResidence,
    WorkPermit,
    StudyPermit,
    VisitorVisa,
    FamilySponsorship,
    BusinessImmigration,
    Citizenship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeline {
    #[serde(rename = "immediate")]
    Immediate,
    #[serde(rename = "3-6months")]
    ThreeToSixMonths,
    #[serde(rename = "6-12months")]
    SixToTwelveMonths,
    #[serde(rename = "1-2years")]
    OneToTwoYears,
    #[serde(rename = "exploring")]
    Exploring,
}

/// Readiness band derived from the additive score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyTier {
    Immediate,
    Strong,
    Strengthen,
}

impl UrgencyTier {
    pub const fn label(self) -> &'static str {
        match self {
            UrgencyTier::Immediate => "immediate",
            UrgencyTier::Strong => "strong",
            UrgencyTier::Strengthen => "strengthen",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "immediate" => Some(UrgencyTier::Immediate),
            "strong" => Some(UrgencyTier::Strong),
            "strengthen" => Some(UrgencyTier::Strengthen),
            _ => None,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            UrgencyTier::Immediate => "Immediate Action Required",
            UrgencyTier::Strong => "Strong Candidate",
            UrgencyTier::Strengthen => "Strengthen Profile First",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            UrgencyTier::Immediate => {
                "Your profile shows strong potential. We recommend booking a case-specific consultation right away."
            }
            UrgencyTier::Strong => {
                "You have a solid foundation. An exploratory consultation can help finalize your strategy."
            }
            UrgencyTier::Strengthen => {
                "There are opportunities to improve your profile. Consider our educational resources or an exploratory consultation."
            }
        }
    }
}

/// Signals the scorer awards points for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSignal {
    JobOffer,
    Experience,
    Education,
    Language,
    Timeline,
}

/// Persisted assessment: the answers plus the derived result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: AssessmentId,
    pub user_id: UserId,
    pub answers: AssessmentAnswers,
    pub urgency: UrgencyTier,
    pub recommended_service: String,
    pub total_score: u8,
    pub created_at: DateTime<Utc>,
}

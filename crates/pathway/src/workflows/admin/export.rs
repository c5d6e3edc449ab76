use chrono::SecondsFormat;
use serde::Serialize;

use crate::workflows::eligibility::AssessmentRecord;

#[derive(Debug)]
pub enum ExportError {
    Csv(csv::Error),
    Io(std::io::Error),
    Encoding(std::string::FromUtf8Error),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Csv(err) => write!(f, "could not write assessment CSV: {}", err),
            ExportError::Io(err) => write!(f, "could not flush assessment CSV: {}", err),
            ExportError::Encoding(err) => write!(f, "assessment CSV is not UTF-8: {}", err),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Csv(err) => Some(err),
            ExportError::Io(err) => Some(err),
            ExportError::Encoding(err) => Some(err),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<std::string::FromUtf8Error> for ExportError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::Encoding(err)
    }
}

#[derive(Serialize)]
struct AssessmentRow<'a> {
    id: &'a str,
    submitted_at: String,
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    phone: &'a str,
    home_country: &'a str,
    preferred_country: &'a str,
    years_of_experience: &'a str,
    urgency: &'static str,
    total_score: u8,
    recommended_service: &'a str,
}

impl<'a> From<&'a AssessmentRecord> for AssessmentRow<'a> {
    fn from(record: &'a AssessmentRecord) -> Self {
        let answers = &record.answers;
        Self {
            id: &record.id.0,
            submitted_at: record.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            first_name: answers.first_name.trim(),
            last_name: answers.last_name.trim(),
            email: answers.email.trim(),
            phone: answers.phone.trim(),
            home_country: answers.home_country.trim(),
            preferred_country: answers.preferred_country_or_default(),
            years_of_experience: answers.years_of_experience.trim(),
            urgency: record.urgency.label(),
            total_score: record.total_score,
            recommended_service: &record.recommended_service,
        }
    }
}

/// Render assessments as CSV with a header row, in the order given.
pub fn assessments_csv(records: &[AssessmentRecord]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(AssessmentRow::from(record))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Io(err.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

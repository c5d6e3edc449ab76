use super::domain::AssessmentAnswers;

/// Required-field failures surfaced inline to the visitor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnswerValidationError {
    #[error("missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

impl AnswerValidationError {
    pub fn fields(&self) -> &[&'static str] {
        match self {
            AnswerValidationError::MissingFields(fields) => fields,
        }
    }
}

/// Presence checks for the personal-information step. Other steps are optional and simply
/// earn no points when left blank.
pub fn validate_answers(answers: &AssessmentAnswers) -> Result<(), AnswerValidationError> {
    let required = [
        ("firstName", &answers.first_name),
        ("lastName", &answers.last_name),
        ("email", &answers.email),
        ("dateOfBirth", &answers.date_of_birth),
    ];

    let missing: Vec<&'static str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| *field)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AnswerValidationError::MissingFields(missing))
    }
}

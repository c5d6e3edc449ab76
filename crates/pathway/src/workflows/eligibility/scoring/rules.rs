use super::super::domain::{
    AssessmentAnswers, EducationLevel, EnglishLevel, ScoreSignal, Timeline, YesNo,
};
use super::config::ScoringRubric;
use super::ScoreComponent;

pub(crate) fn score_answers(
    answers: &AssessmentAnswers,
    rubric: &ScoringRubric,
) -> (Vec<ScoreComponent>, u8) {
    let mut components = Vec::with_capacity(5);

    let job_offer = answers.has_job_offer == Some(YesNo::Yes);
    components.push(component(
        ScoreSignal::JobOffer,
        job_offer,
        rubric.job_offer_points,
        if job_offer {
            "job offer in hand".to_string()
        } else {
            "no job offer reported".to_string()
        },
    ));

    let years = parse_leading_integer(&answers.years_of_experience);
    let experienced = years
        .map(|years| years >= rubric.minimum_experience_years)
        .unwrap_or(false);
    components.push(component(
        ScoreSignal::Experience,
        experienced,
        rubric.experience_points,
        match years {
            Some(years) => format!(
                "{years} year(s) of experience against minimum {}",
                rubric.minimum_experience_years
            ),
            None => "experience not reported".to_string(),
        },
    ));

    let advanced_degree = matches!(
        answers.education_level,
        Some(EducationLevel::Masters | EducationLevel::Phd)
    );
    components.push(component(
        ScoreSignal::Education,
        advanced_degree,
        rubric.education_points,
        if advanced_degree {
            "graduate degree".to_string()
        } else {
            "no graduate degree".to_string()
        },
    ));

    let fluent = answers.english_level == Some(EnglishLevel::Fluent);
    components.push(component(
        ScoreSignal::Language,
        fluent,
        rubric.language_points,
        if fluent {
            "fluent English".to_string()
        } else {
            "English below fluent".to_string()
        },
    ));

    let near_term = matches!(
        answers.timeline,
        Some(Timeline::Immediate | Timeline::ThreeToSixMonths)
    );
    components.push(component(
        ScoreSignal::Timeline,
        near_term,
        rubric.timeline_points,
        if near_term {
            "moving within six months".to_string()
        } else {
            "no near-term timeline".to_string()
        },
    ));

    let total = components
        .iter()
        .fold(0u8, |total, component| total.saturating_add(component.points));

    (components, total)
}

fn component(signal: ScoreSignal, earned: bool, points: u8, notes: String) -> ScoreComponent {
    ScoreComponent {
        signal,
        points: if earned { points } else { 0 },
        notes,
    }
}

/// Reads an integer prefix the way browsers' `parseInt` does: leading whitespace, an
/// optional sign, then digits. Anything else is "not a number".
pub(crate) fn parse_leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if digits.is_empty() {
        return None;
    }

    let value = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}

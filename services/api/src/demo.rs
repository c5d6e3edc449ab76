use crate::infra::Stores;
use chrono::{Duration, Utc};
use clap::Args;
use pathway::error::AppError;
use pathway::workflows::booking::{
    BookingService, GateBlock, GateOutcome, GateReport, IntentStatus, PaymentConfirmation,
    ScheduleConfirmation, ServiceCatalog,
};
use pathway::workflows::eligibility::{
    validate_answers, AssessmentAnswers, AssessmentResult, AssessmentService, EducationLevel,
    EligibilityScorer, EnglishLevel, ImmigrationGoal, ScoringRubric, Timeline, YesNo,
};
use pathway::workflows::identity::{CurrentUser, UserId};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Questionnaire answers as camelCase JSON
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Print the full result as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Stop once the payment session is open.
    #[arg(long)]
    pub(crate) skip_payment: bool,
    /// Currency used for the demo booking.
    #[arg(long, default_value = "CAD")]
    pub(crate) currency: String,
}

pub(crate) fn run_assessment(args: AssessArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.answers)?;
    let answers: AssessmentAnswers = serde_json::from_str(&raw)?;
    let rubric = ScoringRubric::default();
    let maximum = rubric.maximum_score();
    let result = EligibilityScorer::new(rubric).score(&answers);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if let Err(err) = validate_answers(&answers) {
        println!("Note: {err} (a stored submission would be rejected)");
    }
    render_result(&result, maximum);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        skip_payment,
        currency,
    } = args;

    println!("Consultation booking demo");
    let stores = Stores::default();
    let assessments = AssessmentService::new(
        stores.assessments.clone(),
        stores.profiles.clone(),
        ScoringRubric::default(),
    );
    let bookings = BookingService::new(
        ServiceCatalog::standard(),
        currency,
        stores.assessments.clone(),
        stores.bookings.clone(),
        stores.payments.clone(),
    );
    let visitor = demo_visitor();
    let signed_in = Ok(Some(visitor.clone()));

    let answers = demo_answers();
    let preview = assessments.preview(&answers);
    let service = preview.recommended_service.clone();

    println!("\nBefore sign-in");
    render_gate(&bookings.gate(&Ok(None), &service));

    println!("\nSigned in as {}", visitor.email);
    render_gate(&bookings.gate(&signed_in, &service));

    println!("\nEligibility assessment");
    let stored = match assessments.submit(&visitor, answers) {
        Ok(stored) => stored,
        Err(err) => {
            println!("  Submission rejected: {err}");
            return Ok(());
        }
    };
    println!("- Stored assessment {}", stored.record.id.0);
    render_result(&stored.result, ScoringRubric::default().maximum_score());
    render_gate(&bookings.gate(&signed_in, &service));

    println!("\nPayment");
    let session = match bookings.start_payment(&visitor, &service) {
        Ok(session) => session,
        Err(err) => {
            println!("  Payment session unavailable: {err}");
            return Ok(());
        }
    };
    println!(
        "- Booking {} opened intent {} for {} {}",
        session.booking.booking_id.0,
        session.intent.id,
        format_amount(session.intent.amount_cents),
        session.intent.currency.to_ascii_uppercase()
    );
    render_gate(&session.report);

    if skip_payment {
        return Ok(());
    }

    let early = bookings.confirm_payment(
        &visitor,
        &service,
        PaymentConfirmation {
            payment_intent_id: session.intent.id.clone(),
            status: IntentStatus::Succeeded,
        },
    );
    if let Err(err) = early {
        println!("- Confirmation before checkout completes is refused: {err}");
    }

    if let Err(err) = stores
        .payments
        .settle(&session.intent.id, IntentStatus::Succeeded)
    {
        println!("  Simulated checkout failed: {err}");
        return Ok(());
    }
    let report = match bookings.confirm_payment(
        &visitor,
        &service,
        PaymentConfirmation {
            payment_intent_id: session.intent.id.clone(),
            status: IntentStatus::Succeeded,
        },
    ) {
        Ok(report) => report,
        Err(err) => {
            println!("  Confirmation failed: {err}");
            return Ok(());
        }
    };
    println!("- Checkout settled by the processor");
    render_gate(&report);
    if let Some(scheduler) = &report.scheduler {
        println!(
            "  Scheduler: {} (prefill {} / {})",
            scheduler.url,
            scheduler.email,
            scheduler.name.as_deref().unwrap_or("-")
        );
    }

    println!("\nScheduling");
    let slot = Utc::now() + Duration::days(3);
    match bookings.record_schedule(
        &visitor,
        &service,
        ScheduleConfirmation {
            scheduled_at: slot,
            event_id: Some("demo-event".to_string()),
        },
    ) {
        Ok(report) => render_gate(&report),
        Err(err) => println!("  Scheduling failed: {err}"),
    }

    Ok(())
}

fn demo_visitor() -> CurrentUser {
    CurrentUser {
        id: UserId("demo-visitor".to_string()),
        email: "visitor@pathway.example".to_string(),
        full_name: Some("Demo Visitor".to_string()),
    }
}

fn demo_answers() -> AssessmentAnswers {
    AssessmentAnswers {
        first_name: "Demo".to_string(),
        last_name: "Visitor".to_string(),
        email: "visitor@pathway.example".to_string(),
        phone: "+1 555 0142".to_string(),
        date_of_birth: "1991-06-03".to_string(),
        home_country: "Philippines".to_string(),
        is_citizen: Some(YesNo::No),
        years_of_experience: "7".to_string(),
        has_job_offer: Some(YesNo::Yes),
        education_level: Some(EducationLevel::Bachelors),
        english_level: Some(EnglishLevel::Advanced),
        preferred_country: "Canada".to_string(),
        immigration_goal: Some(ImmigrationGoal::WorkPermit),
        timeline: Some(Timeline::ThreeToSixMonths),
        additional_info: String::new(),
    }
}

fn render_result(result: &AssessmentResult, maximum: u8) {
    println!(
        "- {} ({}/{} points)",
        result.title(),
        result.total_score,
        maximum
    );
    println!("  {}", result.description());
    println!("  Recommended service: {}", result.recommended_service);
    println!("  Score components:");
    for component in &result.components {
        println!(
            "    - {:?}: {} ({})",
            component.signal, component.points, component.notes
        );
    }
}

fn render_gate(report: &GateReport) {
    match &report.outcome {
        GateOutcome::Ready(stage) => println!(
            "  Gate: step {} {} -> next {:?}",
            stage.step(),
            stage.label(),
            stage.next_action()
        ),
        GateOutcome::Blocked(GateBlock::Loading { fact }) => {
            println!("  Gate: waiting on {}", fact.label())
        }
        GateOutcome::Blocked(GateBlock::Error { fact, detail }) => {
            println!("  Gate: {} unavailable ({detail})", fact.label())
        }
    }
    if let Some(booking) = &report.booking {
        println!(
            "  Booking {}: {}{}",
            booking.booking_id.0,
            booking.payment_status,
            booking
                .scheduled_at
                .map(|at| format!(" at {}", at.format("%Y-%m-%d %H:%M UTC")))
                .unwrap_or_default()
        );
    }
}

fn format_amount(amount_cents: u64) -> String {
    format!("{}.{:02}", amount_cents / 100, amount_cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_answers_pass_validation_and_score_strongly() {
        let answers = demo_answers();
        assert!(validate_answers(&answers).is_ok());
        let result = EligibilityScorer::default().score(&answers);
        assert!(result.total_score >= 55, "score {}", result.total_score);
    }

    #[test]
    fn amounts_render_with_cents() {
        assert_eq!(format_amount(15_000), "150.00");
        assert_eq!(format_amount(25_005), "250.05");
    }

    #[test]
    fn demo_runs_end_to_end() {
        run_demo(DemoArgs {
            skip_payment: false,
            currency: "CAD".to_string(),
        })
        .expect("demo completes");
    }
}

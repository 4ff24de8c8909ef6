use crate::infra::InMemoryRecordStore;
use clap::Args;
use freight_intake::config::IntakeConfig;
use freight_intake::error::AppError;
use freight_intake::workflows::intake::pricing::FeeAmount;
use freight_intake::workflows::intake::{
    estimate, Answers, EvaluationEngine, IntakeService, IntakeView, NextOutcome, PricingEstimate,
    PricingSchedule, RoutingProfile, Scores, SubmissionReceipt, QUOTE_AFTER_REVIEW,
};
use serde_json::{json, Value};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// JSON file holding a saved answers object
    #[arg(long)]
    pub(crate) answers: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Cargo type for the scripted request (e.g. general_goods, food_beverages)
    #[arg(long, default_value = "food_beverages")]
    pub(crate) cargo_type: String,
    /// Print every field update as it is applied
    #[arg(long)]
    pub(crate) verbose: bool,
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.answers)?;
    let answers = parse_answers(&raw)?;

    let engine = EvaluationEngine::default();
    let assessment = engine.assess(&answers);
    let profile = RoutingProfile::new(assessment.routing, &answers);

    println!("Assessment for {}", args.answers.display());
    render_scores(&assessment.scores);
    for component in &assessment.components {
        println!(
            "  - {:?} +{}: {}",
            component.dimension, component.points, component.notes
        );
    }
    render_routing(&profile);
    render_pricing(
        estimate(&answers, assessment.routing, &PricingSchedule::standard()).as_ref(),
    );
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(InMemoryRecordStore::default());
    let service = IntakeService::new(
        store.clone(),
        Default::default(),
        IntakeConfig::default(),
    );

    println!("Freight intake demo");
    let view = service.start();
    let session_id = view.session_id.clone();
    println!("Session {}", session_id);
    render_step(&view);

    for (field, value) in scripted_import(&args.cargo_type) {
        let view = service.set_field(&session_id, field, value.clone())?;
        if args.verbose {
            println!(
                "  set {field} = {value} (urgency {}, routing {})",
                view.scores.urgency,
                view.routing.label
            );
        }
    }

    loop {
        match service.next(&session_id)? {
            NextOutcome::Moved { view } => render_step(&view),
            NextOutcome::Submitted { receipt } => {
                render_receipt(&receipt);
                break;
            }
        }
    }

    println!("\nRecords held by the in-memory store: {}", store.len());
    Ok(())
}

fn parse_answers(raw: &str) -> Result<Answers, AppError> {
    serde_json::from_str(raw)
        .map_err(|err| AppError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}

fn scripted_import(cargo_type: &str) -> Vec<(&'static str, Value)> {
    let mut fields = vec![
        ("first_name", json!("Hemi")),
        ("last_name", json!("Walker")),
        ("email", json!("hemi@kauri-imports.co.nz")),
        ("phone", json!("+64 21 555 0142")),
        ("consent_checkbox", json!(true)),
        ("direction", json!("import")),
        ("customer_type", json!("business")),
        ("company_name", json!("Kauri Imports Ltd")),
        ("goods_location", json!("arrived")),
        ("shipment_method", json!("air_freight")),
        ("needs_port_delivery", json!("no")),
        ("cargo_type", json!(cargo_type)),
        ("document_status.air_waybill", json!("upload")),
        ("document_status.commercial_invoice", json!("upload")),
        ("customs_code_status", json!("need_help")),
    ];
    match cargo_type {
        "food_beverages" => fields.push(("requires_temperature_control", json!("no"))),
        "personal_effects" => fields.push(("personal_item_condition", json!("used"))),
        _ => {}
    }
    fields
}

fn render_step(view: &IntakeView) {
    println!(
        "\nStep {}/{}: {} ({}% complete)",
        view.current_step.position,
        view.steps.len(),
        view.current_step.title,
        view.completion_percentage
    );
    render_scores(&view.scores);
    println!("  routing: {}", view.routing.label);
}

fn render_scores(scores: &Scores) {
    println!(
        "  urgency {} | complexity {} | readiness {}",
        scores.urgency, scores.complexity, scores.readiness
    );
}

fn render_routing(profile: &RoutingProfile) {
    println!("\n{} ({})", profile.headline, profile.label);
    println!("  {}", profile.commitment);
    for (index, step) in profile.next_steps.iter().enumerate() {
        println!("  {}. {}", index + 1, step);
    }
}

fn render_pricing(pricing: Option<&PricingEstimate>) {
    let Some(pricing) = pricing else {
        println!("\n{QUOTE_AFTER_REVIEW}");
        return;
    };

    println!("\nEstimated fees");
    println!("  Base clearance fee: {}", pricing.base_fee);
    for line in &pricing.surcharges {
        println!("  {}: {}", line.label, line.amount);
    }
    println!("  Subtotal: {}", pricing.subtotal);
    println!("  GST: {}", pricing.tax);
    println!("  Total: {}", pricing.total);
    for fee in pricing.government_fees.iter().chain(pricing.local_delivery.iter()) {
        match &fee.amount {
            FeeAmount::Fixed(amount) => println!("  + {}: {}", fee.label, amount),
            FeeAmount::Variable => println!("  + {}: quoted separately", fee.label),
        }
    }
    for note in &pricing.notes {
        println!("  * {note}");
    }
}

fn render_receipt(receipt: &SubmissionReceipt) {
    println!("\nSubmitted quote request {}", receipt.reference);
    println!("  record {}", receipt.record_id);
    render_scores(&receipt.scores);
    render_routing(&receipt.routing);
    render_pricing(receipt.pricing.as_ref());
}

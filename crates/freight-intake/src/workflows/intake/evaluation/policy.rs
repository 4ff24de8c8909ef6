use serde::{Deserialize, Serialize};

use super::super::domain::{Answers, ArrivalMethod, ContainerType, ShipmentMethod};
use super::config::EvaluationConfig;
use super::Scores;

/// Business queue a completed request lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingDecision {
    Urgent,
    Specialist,
    Standard,
    Education,
}

impl RoutingDecision {
    pub const fn label(self) -> &'static str {
        match self {
            RoutingDecision::Urgent => "Urgent priority",
            RoutingDecision::Specialist => "Specialist required",
            RoutingDecision::Standard => "Standard processing",
            RoutingDecision::Education => "Education pathway",
        }
    }

    /// Response commitment shown to the customer.
    pub const fn summary(self) -> &'static str {
        match self {
            RoutingDecision::Urgent => {
                "We'll contact you within 30 minutes to expedite your clearance"
            }
            RoutingDecision::Specialist => {
                "A specialist will review your requirements and contact you within 2 hours"
            }
            RoutingDecision::Standard => "You'll receive your detailed quote within 4 hours",
            RoutingDecision::Education => {
                "We've sent educational resources and will follow up in 3-5 days"
            }
        }
    }

    pub const fn next_steps(self) -> [&'static str; 4] {
        match self {
            RoutingDecision::Urgent => [
                "Immediate broker assignment",
                "Document review within the hour",
                "Express processing initiated",
                "Real-time updates via your preferred method",
            ],
            RoutingDecision::Specialist => [
                "Specialist assignment within 2 hours",
                "Detailed requirements analysis",
                "Consultation call scheduled",
                "Custom solution development",
            ],
            RoutingDecision::Standard => [
                "Quote delivered within 4 hours",
                "Document checklist provided",
                "Dedicated broker assignment",
                "Processing timeline confirmed",
            ],
            RoutingDecision::Education => [
                "Import guide sent to your email",
                "Follow-up scheduled in 3-5 days",
                "Tips for working with suppliers",
                "We're here when you're ready to proceed",
            ],
        }
    }
}

/// Presentation bundle derived from a decision and the answers that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingProfile {
    pub decision: RoutingDecision,
    pub label: &'static str,
    pub headline: &'static str,
    pub commitment: &'static str,
    pub next_steps: Vec<&'static str>,
}

impl RoutingProfile {
    pub fn new(decision: RoutingDecision, answers: &Answers) -> Self {
        Self {
            decision,
            label: decision.label(),
            headline: headline(decision, answers),
            commitment: decision.summary(),
            next_steps: decision.next_steps().to_vec(),
        }
    }
}

fn headline(decision: RoutingDecision, answers: &Answers) -> &'static str {
    let payment = answers.shipping_payment;
    match decision {
        RoutingDecision::Standard if payment.is_some_and(|p| p.is_clearance_only()) => {
            "Customs clearance"
        }
        RoutingDecision::Specialist if payment.is_some_and(|p| p.is_freight_forwarding()) => {
            "Freight forwarding"
        }
        other => other.label(),
    }
}

/// First matching rule wins; the order below is the business rule.
pub(crate) fn resolve_routing(
    scores: &Scores,
    answers: &Answers,
    config: &EvaluationConfig,
) -> RoutingDecision {
    let payment = answers.shipping_payment;
    let urgent_enough = scores.urgency.at_least(config.standard_urgency_floor);

    if answers.container_type == Some(ContainerType::Fcl) {
        return RoutingDecision::Specialist;
    }

    if scores.urgency.at_least(config.urgent_threshold) {
        return RoutingDecision::Urgent;
    }

    if scores.complexity.at_least(config.specialist_threshold) {
        return RoutingDecision::Specialist;
    }

    if payment.is_some_and(|p| p.is_clearance_only()) && urgent_enough {
        return RoutingDecision::Standard;
    }

    if payment.is_some_and(|p| p.is_freight_forwarding())
        && scores.complexity.at_least(config.freight_complexity_floor)
    {
        return RoutingDecision::Specialist;
    }

    let ready = scores.readiness.at_least(config.readiness_floor);
    let by_sea = answers.shipment_method == Some(ShipmentMethod::SeaFreight);
    let by_courier = answers.shipment_method == Some(ShipmentMethod::Courier)
        || answers.arrival_method == Some(ArrivalMethod::Courier);
    if (urgent_enough && ready) || (urgent_enough && by_sea) || by_courier {
        return RoutingDecision::Standard;
    }

    RoutingDecision::Education
}

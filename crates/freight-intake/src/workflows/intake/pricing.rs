use serde::{Deserialize, Serialize};

use super::domain::{Answers, CargoType, ContainerType, CustomsCodeStatus, Direction};
use super::evaluation::RoutingDecision;
use super::money::Money;

/// Shown in place of an estimate when pricing is withheld.
pub const QUOTE_AFTER_REVIEW: &str =
    "Based on your shipment details, we'll provide a personalised quote after reviewing your information.";

pub const INVOICE_LINE_NOTE: &str =
    "Our rate includes the classification of 5 invoice lines. Each additional line costs NZD 5 + GST per line.";

pub const GOVERNMENT_FEE_NOTE: &str =
    "Government fees depend on goods classification, origin country, and declared value";

/// Fee table for the clearance service. Amounts exclude GST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSchedule {
    pub base_fee: Money,
    pub customs_code_fee: Money,
    pub biosecurity_fee: Money,
    pub tax_rate_percent: u32,
    pub transaction_fee: Money,
}

impl PricingSchedule {
    pub fn standard() -> Self {
        Self {
            base_fee: Money::from_dollars(197),
            customs_code_fee: Money::from_dollars(95),
            biosecurity_fee: Money::from_dollars(67),
            tax_rate_percent: 15,
            transaction_fee: Money::from_cents(10_680),
        }
    }
}

impl Default for PricingSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surcharge {
    pub label: String,
    pub amount: Money,
}

/// Amount of an informational line that never enters the subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum FeeAmount {
    Fixed(Money),
    Variable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InformationalFee {
    pub label: String,
    pub amount: FeeAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingEstimate {
    pub base_fee: Money,
    pub surcharges: Vec<Surcharge>,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub government_fees: Vec<InformationalFee>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_delivery: Option<InformationalFee>,
    pub notes: Vec<String>,
}

/// Whether an immediate estimate may be shown for this routing outcome.
pub fn pricing_available(answers: &Answers, routing: RoutingDecision) -> bool {
    if routing == RoutingDecision::Specialist
        || answers.container_type == Some(ContainerType::Fcl)
    {
        return false;
    }

    answers
        .shipping_payment
        .is_some_and(|payment| payment.is_clearance_only())
        || matches!(routing, RoutingDecision::Urgent | RoutingDecision::Standard)
}

pub fn estimate(
    answers: &Answers,
    routing: RoutingDecision,
    schedule: &PricingSchedule,
) -> Option<PricingEstimate> {
    if !pricing_available(answers, routing) {
        return None;
    }

    let mut surcharges = Vec::new();
    if answers.customs_code_status == Some(CustomsCodeStatus::NeedHelp) {
        surcharges.push(Surcharge {
            label: "Customs Client Code Application".to_string(),
            amount: schedule.customs_code_fee,
        });
    }
    if answers.cargo_type == Some(CargoType::FoodBeverages) {
        surcharges.push(Surcharge {
            label: "BIO Security Clearance".to_string(),
            amount: schedule.biosecurity_fee,
        });
    }

    let subtotal = schedule.base_fee + surcharges.iter().map(|line| line.amount).sum::<Money>();
    let tax = subtotal.percent(schedule.tax_rate_percent);
    let total = subtotal + tax;

    Some(PricingEstimate {
        base_fee: schedule.base_fee,
        surcharges,
        subtotal,
        tax,
        total,
        government_fees: government_fees(answers, schedule),
        local_delivery: local_delivery(answers),
        notes: vec![INVOICE_LINE_NOTE.to_string(), GOVERNMENT_FEE_NOTE.to_string()],
    })
}

fn government_fees(answers: &Answers, schedule: &PricingSchedule) -> Vec<InformationalFee> {
    let mut fees = vec![
        InformationalFee {
            label: "Customs Transaction Fee (CTF)".to_string(),
            amount: FeeAmount::Fixed(schedule.transaction_fee),
        },
        InformationalFee {
            label: "Import Duty".to_string(),
            amount: FeeAmount::Variable,
        },
        InformationalFee {
            label: format!("GST on Goods ({}%)", schedule.tax_rate_percent),
            amount: FeeAmount::Variable,
        },
    ];
    if answers.cargo_type == Some(CargoType::FoodBeverages) {
        fees.push(InformationalFee {
            label: "MPI Biosecurity Fees".to_string(),
            amount: FeeAmount::Variable,
        });
    }
    fees
}

fn local_delivery(answers: &Answers) -> Option<InformationalFee> {
    if !answers.wants_port_delivery() {
        return None;
    }
    let label = match answers.direction {
        Some(Direction::Export) => "Local Collection",
        _ => "Local Delivery",
    };
    Some(InformationalFee {
        label: label.to_string(),
        amount: FeeAmount::Variable,
    })
}

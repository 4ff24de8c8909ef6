use serde::{Deserialize, Serialize};

use super::domain::Answers;
use super::validation::{self, ValidationReport};
use super::visibility;

/// Fixed identifiers for the wizard pages, in traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    ContactInfo,
    Classification,
    GoodsLocation,
    ArrivalDetails,
    ShippingMethod,
    PaymentTerms,
    DeliveryOptions,
    CargoType,
    DocumentUpload,
    CustomsCode,
    Review,
}

/// Immutable description of one wizard step.
#[derive(Clone, Copy)]
pub struct StepDefinition {
    pub id: StepId,
    pub title: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub validate: fn(&Answers) -> ValidationReport,
    pub visible: fn(&Answers) -> bool,
}

impl StepDefinition {
    pub fn validate(&self, answers: &Answers) -> ValidationReport {
        (self.validate)(answers)
    }

    pub fn is_visible(&self, answers: &Answers) -> bool {
        (self.visible)(answers)
    }
}

impl std::fmt::Debug for StepDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepDefinition")
            .field("id", &self.id)
            .field("required", &self.required)
            .finish()
    }
}

pub static STEPS: [StepDefinition; 11] = [
    StepDefinition {
        id: StepId::ContactInfo,
        title: "Let's get started",
        description: "We'll use these details to send your quote",
        required: true,
        validate: validation::validate_contact,
        visible: visibility::always,
    },
    StepDefinition {
        id: StepId::Classification,
        title: "Tell us about your shipment",
        description: "Import or export, business or personal",
        required: true,
        validate: validation::validate_classification,
        visible: visibility::always,
    },
    StepDefinition {
        id: StepId::GoodsLocation,
        title: "Where are your goods now?",
        description: "Timing determines how quickly we need to act",
        required: true,
        validate: validation::validate_goods_location,
        visible: visibility::shows_goods_timing,
    },
    StepDefinition {
        id: StepId::ArrivalDetails,
        title: "Arrival details",
        description: "How and when the goods arrive",
        required: true,
        validate: validation::validate_arrival_details,
        visible: visibility::shows_arrival_details,
    },
    StepDefinition {
        id: StepId::ShippingMethod,
        title: "How are your goods shipping?",
        description: "Sea, air, or courier",
        required: true,
        validate: validation::validate_shipping_method,
        visible: visibility::shows_shipping_method,
    },
    StepDefinition {
        id: StepId::PaymentTerms,
        title: "Shipping arrangements",
        description: "Who pays for international freight",
        required: true,
        validate: validation::validate_payment_terms,
        visible: visibility::shows_payment_terms,
    },
    StepDefinition {
        id: StepId::DeliveryOptions,
        title: "Delivery options",
        description: "Do you need delivery from the port?",
        required: true,
        validate: validation::validate_delivery_options,
        visible: visibility::shows_delivery_options,
    },
    StepDefinition {
        id: StepId::CargoType,
        title: "What are you shipping?",
        description: "Cargo type affects biosecurity and handling",
        required: true,
        validate: validation::validate_cargo_type,
        visible: visibility::always,
    },
    StepDefinition {
        id: StepId::DocumentUpload,
        title: "Documents",
        description: "Upload what you have; we'll help with the rest",
        required: true,
        validate: validation::validate_documents,
        visible: visibility::always,
    },
    StepDefinition {
        id: StepId::CustomsCode,
        title: "Customs Client Code",
        description: "Required by NZ Customs for every importer",
        required: true,
        validate: validation::validate_customs_code,
        visible: visibility::shows_customs_code,
    },
    StepDefinition {
        id: StepId::Review,
        title: "Review and submit",
        description: "Check your answers before sending",
        required: false,
        validate: validation::validate_review,
        visible: visibility::always,
    },
];

pub fn definition(id: StepId) -> &'static StepDefinition {
    // Registry order matches the enum declaration order.
    &STEPS[id as usize]
}

/// Order-preserving subsequence of the registry visible for these answers.
pub fn visible_steps(answers: &Answers) -> Vec<&'static StepDefinition> {
    STEPS
        .iter()
        .filter(|step| step.is_visible(answers))
        .collect()
}

/// Position of `current` among the visible steps, falling back to the first visible step.
pub fn resolve_index(visible: &[&'static StepDefinition], current: StepId) -> usize {
    visible
        .iter()
        .position(|step| step.id == current)
        .unwrap_or(0)
}

/// Where a restored session should pick up: the stored step when still reachable,
/// otherwise the first visible step that does not validate.
pub fn resume_step(answers: &Answers, stored: Option<StepId>) -> StepId {
    let visible = visible_steps(answers);
    if let Some(step) = stored.filter(|id| visible.iter().any(|step| step.id == *id)) {
        return step;
    }
    visible
        .iter()
        .find(|step| !step.validate(answers).is_valid())
        .map(|step| step.id)
        .unwrap_or(StepId::Review)
}

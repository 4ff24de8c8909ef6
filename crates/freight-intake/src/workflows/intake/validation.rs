use std::sync::OnceLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use super::documents::document_checklist;
use super::domain::{
    Answers, CustomerType, CustomsCodeStatus, DocumentId, DocumentStatus, GoodsTiming,
    ShipmentMethod,
};

pub const MIN_PHONE_LENGTH: usize = 8;
pub const CUSTOMS_CODE_LENGTH: usize = 8;

/// Message surfaced next to a single offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Outcome of validating one step. Empty means the step may be left.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    fn require(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.errors.push(FieldError {
                field: field.to_string(),
                message: message.to_string(),
            });
        }
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"))
}

pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn is_valid_email(value: &str) -> bool {
    email_pattern().is_match(value.trim())
}

pub fn is_valid_phone(value: &str) -> bool {
    value.trim().chars().count() >= MIN_PHONE_LENGTH
}

pub fn is_valid_customs_code(value: &str) -> bool {
    value.trim().chars().count() == CUSTOMS_CODE_LENGTH
}

pub fn validate_contact(answers: &Answers) -> ValidationReport {
    let mut report = ValidationReport::valid();
    report.require(
        is_present(&answers.first_name),
        "first_name",
        "Please enter your first name",
    );
    report.require(
        is_present(&answers.last_name),
        "last_name",
        "Please enter your last name",
    );

    if !is_present(&answers.email) {
        report.require(false, "email", "Please enter your email address");
    } else {
        report.require(
            is_valid_email(&answers.email),
            "email",
            "Please enter a valid email address",
        );
    }

    if !is_present(&answers.phone) {
        report.require(false, "phone", "Please enter your phone number");
    } else {
        report.require(
            is_valid_phone(&answers.phone),
            "phone",
            "Please enter a valid phone number",
        );
    }

    report.require(
        answers.consent_checkbox,
        "consent_checkbox",
        "Please provide consent to proceed with your quote request",
    );
    report
}

pub fn validate_classification(answers: &Answers) -> ValidationReport {
    let mut report = ValidationReport::valid();
    report.require(
        answers.direction.is_some(),
        "direction",
        "Please select import or export",
    );
    report.require(
        answers.customer_type.is_some(),
        "customer_type",
        "Please select business or personal",
    );
    report.require(
        answers.customer_type != Some(CustomerType::Business) || is_present(&answers.company_name),
        "company_name",
        "Please enter your company name",
    );
    report
}

pub fn validate_goods_location(answers: &Answers) -> ValidationReport {
    let mut report = ValidationReport::valid();
    report.require(
        answers.goods_location.is_some(),
        "goods_location",
        "Please select where your goods are currently located",
    );
    report
}

pub fn validate_arrival_details(answers: &Answers) -> ValidationReport {
    let mut report = ValidationReport::valid();
    match answers.goods_location {
        Some(GoodsTiming::Arrived) => report.require(
            answers.arrival_method.is_some(),
            "arrival_method",
            "Please select how your goods arrived",
        ),
        Some(GoodsTiming::WithinTwoDays | GoodsTiming::WithinWeek | GoodsTiming::MoreThanWeek) => {
            report.require(
                answers.arrival_timeline.is_some(),
                "arrival_timeline",
                "Please select expected arrival timeline",
            )
        }
        _ => {}
    }
    report
}

pub fn validate_shipping_method(answers: &Answers) -> ValidationReport {
    let mut report = ValidationReport::valid();
    report.require(
        answers.shipment_method.is_some(),
        "shipment_method",
        "Please select shipping method",
    );
    report.require(
        answers.shipment_method != Some(ShipmentMethod::SeaFreight)
            || answers.container_type.is_some(),
        "container_type",
        "Please select container type",
    );
    report
}

pub fn validate_payment_terms(answers: &Answers) -> ValidationReport {
    let mut report = ValidationReport::valid();
    if answers.is_export() {
        report.require(
            answers.export_service_needed.is_some(),
            "export_service_needed",
            "Please select export service type",
        );
        report.require(
            answers.destination_country.is_some(),
            "destination_country",
            "Please select destination country",
        );
    } else {
        report.require(
            answers.shipping_payment.is_some(),
            "shipping_payment",
            "Please select who pays for shipping",
        );
    }
    report
}

pub fn validate_delivery_options(answers: &Answers) -> ValidationReport {
    let mut report = ValidationReport::valid();
    report.require(
        answers.needs_port_delivery.is_some(),
        "needs_port_delivery",
        "Please select your delivery preference",
    );
    report
}

pub fn validate_cargo_type(answers: &Answers) -> ValidationReport {
    let mut report = ValidationReport::valid();
    let Some(cargo) = answers.cargo_type else {
        report.require(
            false,
            "cargo_type",
            "Please select the type of goods you are shipping",
        );
        return report;
    };

    if cargo.needs_item_condition() {
        report.require(
            answers.personal_item_condition.is_some(),
            "personal_item_condition",
            "Please specify if items are used or new",
        );
    }
    if cargo.needs_temperature_answer() {
        report.require(
            answers.requires_temperature_control.is_some(),
            "requires_temperature_control",
            "Please specify if temperature control is required",
        );
    }
    report
}

pub fn validate_documents(answers: &Answers) -> ValidationReport {
    let mut report = ValidationReport::valid();
    let any_required_addressed = document_checklist(answers)
        .iter()
        .filter(|document| document.required)
        .any(|document| answers.document_status(document.id).is_some());
    report.require(
        any_required_addressed,
        "documents",
        "Please upload at least one required document or indicate availability",
    );

    if answers.document_status(DocumentId::PackingList) == Some(DocumentStatus::DontHave) {
        report.require(
            !answers.wants_port_delivery() || is_present(&answers.packing_info_combined),
            "packing_info_combined",
            "Please provide packing information - required for delivery service",
        );
    }
    report
}

pub fn validate_customs_code(answers: &Answers) -> ValidationReport {
    let mut report = ValidationReport::valid();
    report.require(
        answers.customs_code_status.is_some(),
        "customs_code_status",
        "Please select if you have a Customs Client Code",
    );
    if answers.customs_code_status == Some(CustomsCodeStatus::HaveCode) {
        report.require(
            is_valid_customs_code(&answers.customs_code_number),
            "customs_code_number",
            "Please enter a valid 8-character Customs Client Code",
        );
    }
    report
}

pub fn validate_review(_answers: &Answers) -> ValidationReport {
    ValidationReport::valid()
}

//! Visibility predicates for the conditional wizard steps.
//!
//! Each rule reads the full answer snapshot and nothing else, so a changed answer is
//! reflected on the very next evaluation. Unanswered fields count as "not yet answered".

use super::domain::{Answers, Direction, GoodsTiming};

pub fn always(_answers: &Answers) -> bool {
    true
}

pub fn shows_goods_timing(answers: &Answers) -> bool {
    answers.is_import()
}

/// Arrival details are collected by the timing step now; the step stays registered but
/// is never reached.
pub fn shows_arrival_details(_answers: &Answers) -> bool {
    false
}

pub fn shows_shipping_method(answers: &Answers) -> bool {
    !answers
        .goods_location
        .map(GoodsTiming::is_planning_only)
        .unwrap_or(false)
}

/// Exports always choose a service. Imports only pick Incoterms before the goods ship.
pub fn shows_payment_terms(answers: &Answers) -> bool {
    match answers.direction {
        Some(Direction::Export) => true,
        Some(Direction::Import) | None => match answers.goods_location {
            Some(GoodsTiming::Arrived | GoodsTiming::WithinTwoDays) => false,
            timing => timing == Some(GoodsTiming::NotShippedYet),
        },
    }
}

pub fn shows_delivery_options(answers: &Answers) -> bool {
    shows_shipping_method(answers)
}

pub fn shows_customs_code(answers: &Answers) -> bool {
    answers.is_import()
}

use std::fmt;

use serde::{Deserialize, Serialize};

use super::super::documents::document_tally;
use super::super::domain::{
    Answers, CargoType, DestinationCountry, GoodsTiming, ShipmentMethod, ShippingPayment,
};
use super::config::EvaluationConfig;
use super::ScoreComponent;

pub const MAX_SCORE: u8 = 10;

/// Heuristic score bounded to `0..=10`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    pub fn clamped(raw: u32) -> Self {
        Score(raw.min(u32::from(MAX_SCORE)) as u8)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub fn at_least(self, threshold: u8) -> bool {
        self.0 >= threshold
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, MAX_SCORE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreDimension {
    Urgency,
    Complexity,
    Readiness,
}

/// Running total for one dimension; the audit trail keeps the unclamped points.
struct Ledger {
    dimension: ScoreDimension,
    total: u32,
    components: Vec<ScoreComponent>,
}

impl Ledger {
    fn new(dimension: ScoreDimension) -> Self {
        Self {
            dimension,
            total: 0,
            components: Vec::new(),
        }
    }

    fn add(&mut self, points: u8, notes: impl Into<String>) {
        if points == 0 {
            return;
        }
        self.total += u32::from(points);
        self.components.push(ScoreComponent {
            dimension: self.dimension,
            points,
            notes: notes.into(),
        });
    }

    fn finish(self, components: &mut Vec<ScoreComponent>) -> Score {
        components.extend(self.components);
        Score::clamped(self.total)
    }
}

pub(crate) fn urgency(answers: &Answers, components: &mut Vec<ScoreComponent>) -> Score {
    let mut ledger = Ledger::new(ScoreDimension::Urgency);

    if let Some(timing) = answers.goods_location {
        let points = match timing {
            GoodsTiming::Arrived => 10,
            GoodsTiming::WithinTwoDays
                if answers.shipment_method == Some(ShipmentMethod::AirFreight) =>
            {
                9
            }
            GoodsTiming::WithinTwoDays => 8,
            GoodsTiming::WithinWeek => 5,
            GoodsTiming::MoreThanWeek => 2,
            GoodsTiming::NotShippedYet => 1,
            GoodsTiming::Planning | GoodsTiming::OrderedNotShipped => 0,
        };
        ledger.add(points, format!("goods timing: {}", timing.label()));
    }

    if let Some(cargo) = answers.cargo_type {
        if cargo.raises_urgency() {
            ledger.add(2, format!("food cargo: {}", cargo.label()));
        }
        if cargo.is_hazardous() {
            ledger.add(3, "hazardous cargo");
        }
    }

    ledger.finish(components)
}

pub(crate) fn complexity(
    answers: &Answers,
    config: &EvaluationConfig,
    components: &mut Vec<ScoreComponent>,
) -> Score {
    let mut ledger = Ledger::new(ScoreDimension::Complexity);

    if let Some(cargo) = answers.cargo_type {
        let points = match cargo {
            CargoType::DocumentsSamples | CargoType::Other => 0,
            CargoType::GeneralGoods => 1,
            CargoType::PersonalEffects => 2,
            CargoType::FoodBeverages => 4,
            CargoType::FrozenGoods | CargoType::PerishableGoods | CargoType::VehiclesMachinery => 5,
            CargoType::ChemicalsDangerous => 8,
        };
        ledger.add(points, format!("cargo type: {}", cargo.label()));
    }

    match answers.shipping_payment {
        Some(ShippingPayment::CustomerPaysExw) => ledger.add(4, "customer arranges door to door"),
        Some(ShippingPayment::CustomerPaysFob) => ledger.add(2, "customer arranges from origin port"),
        _ => {}
    }

    if let Some(value) = answers.declared_value {
        if value > config.high_value_threshold {
            ledger.add(
                2,
                format!("declared value {value} above {}", config.high_value_threshold),
            );
        }
    }

    match answers.destination_country {
        Some(DestinationCountry::China) => ledger.add(3, "destination: China"),
        Some(DestinationCountry::Usa) => ledger.add(1, "destination: USA"),
        _ => {}
    }

    ledger.finish(components)
}

pub(crate) fn readiness(answers: &Answers, components: &mut Vec<ScoreComponent>) -> Score {
    let mut ledger = Ledger::new(ScoreDimension::Readiness);

    if answers.has_contact_details() {
        ledger.add(3, "contact details complete");
    }
    if answers.has_classification() {
        ledger.add(3, "shipment classified");
    }

    let tally = document_tally(answers);
    if !tally.any_recorded || tally.required == 0 {
        ledger.add(2, "no documents applicable yet");
    } else {
        // Round half up of uploaded / required * 4 in integer arithmetic.
        let points = (8 * tally.uploaded + tally.required) / (2 * tally.required);
        ledger.add(
            points as u8,
            format!("{} of {} required documents uploaded", tally.uploaded, tally.required),
        );
    }

    ledger.finish(components)
}

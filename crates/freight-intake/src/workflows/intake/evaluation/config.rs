use serde::{Deserialize, Serialize};

use super::super::money::Money;

/// Thresholds that steer scoring and the routing rule list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub urgent_threshold: u8,
    pub specialist_threshold: u8,
    pub standard_urgency_floor: u8,
    pub freight_complexity_floor: u8,
    pub readiness_floor: u8,
    /// Declared values strictly above this add complexity.
    pub high_value_threshold: Money,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            urgent_threshold: 8,
            specialist_threshold: 8,
            standard_urgency_floor: 4,
            freight_complexity_floor: 4,
            readiness_floor: 6,
            high_value_threshold: Money::from_dollars(1000),
        }
    }
}

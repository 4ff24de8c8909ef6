//! Freight customs-clearance intake: step routing, scoring, routing, and pricing.
//!
//! Answers flow one way per transition: visibility filter, validation gate, scoring,
//! routing, then pricing. Everything below `session` is a pure function of [`Answers`];
//! `service` and `router` add the record store and HTTP surface on top.

pub mod changes;
pub mod documents;
pub mod domain;
pub mod evaluation;
pub mod money;
pub mod pricing;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;
pub mod steps;
pub mod validation;
pub mod visibility;

#[cfg(test)]
mod tests;

pub use changes::{apply_field_change, FieldChangeError};
pub use documents::{document_checklist, document_tally, DocumentRequirement, DocumentTally};
pub use domain::{Answers, RecordId, SessionId};
pub use evaluation::{
    Assessment, EvaluationConfig, EvaluationEngine, RoutingDecision, RoutingProfile, Score,
    Scores,
};
pub use money::Money;
pub use pricing::{estimate, PricingEstimate, PricingSchedule, Surcharge, QUOTE_AFTER_REVIEW};
pub use repository::{RecordStatus, RecordStore, SessionSnapshot, StoreError};
pub use router::intake_router;
pub use service::{IntakeService, IntakeServiceError, NextOutcome, RestoreError, SubmissionReceipt};
pub use session::{Advance, IntakeSession, IntakeView};
pub use steps::{StepDefinition, StepId};
pub use validation::{FieldError, ValidationReport};

//! Intake engine for freight customs-clearance quote requests.
//!
//! The `workflows::intake` module holds the step routing, scoring, routing, and pricing
//! logic; `config`, `telemetry`, and `error` provide the process-level plumbing shared with
//! the HTTP service.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

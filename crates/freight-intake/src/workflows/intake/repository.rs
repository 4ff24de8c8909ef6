use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Answers, RecordId, SessionId};
use super::evaluation::{RoutingDecision, Scores};
use super::steps::StepId;

/// Lifecycle marker stored alongside each snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    InProgress,
    Completed,
}

impl RecordStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RecordStatus::InProgress => "in_progress",
            RecordStatus::Completed => "completed",
        }
    }
}

/// Answers plus the fields derived from them at save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
    pub status: RecordStatus,
    pub current_step: StepId,
    pub completion_percentage: u8,
    pub answers: Answers,
    pub scores: Scores,
    pub routing: RoutingDecision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub saved_at: DateTime<Utc>,
}

/// Remote record store holding in-progress and submitted requests.
pub trait RecordStore: Send + Sync {
    /// Create or update the record for an in-progress session.
    fn save(&self, snapshot: &SessionSnapshot) -> Result<RecordId, StoreError>;
    /// Persist the completed request; failures must reach the customer.
    fn submit_final(&self, snapshot: &SessionSnapshot) -> Result<RecordId, StoreError>;
    fn fetch(&self, record_id: &RecordId) -> Result<Option<SessionSnapshot>, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("record store rejected the snapshot: {0}")]
    Rejected(String),
}

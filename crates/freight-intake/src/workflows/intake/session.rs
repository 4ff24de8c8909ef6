//! A single customer's pass through the wizard.
//!
//! `IntakeSession` is a value: every transition returns a new session and leaves the old
//! one untouched. Visible steps, scores, routing, and pricing are derived on demand in
//! [`IntakeSession::view`]; nothing derived is stored on the session itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::changes::{apply_field_change, FieldChangeError};
use super::documents::{document_checklist, DocumentRequirement};
use super::domain::{Answers, RecordId, SessionId};
use super::evaluation::{EvaluationEngine, RoutingProfile, ScoreComponent, Scores};
use super::pricing::{estimate, PricingEstimate, PricingSchedule, QUOTE_AFTER_REVIEW};
use super::repository::{RecordStatus, SessionSnapshot};
use super::steps::{self, StepDefinition, StepId};
use super::validation::ValidationReport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeSession {
    pub session_id: SessionId,
    pub record_id: Option<RecordId>,
    pub current: StepId,
    pub answers: Answers,
}

/// Outcome of asking to move forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The current step failed validation; nothing changed.
    Blocked(ValidationReport),
    Moved(IntakeSession),
    /// The current step is the last visible one and validated.
    ReadyToSubmit,
}

impl IntakeSession {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            record_id: None,
            current: StepId::ContactInfo,
            answers: Answers::default(),
        }
    }

    pub fn restored(snapshot: SessionSnapshot) -> Self {
        let current = steps::resume_step(&snapshot.answers, Some(snapshot.current_step));
        Self {
            session_id: snapshot.session_id,
            record_id: snapshot.record_id,
            current,
            answers: snapshot.answers,
        }
    }

    pub fn visible_steps(&self) -> Vec<&'static StepDefinition> {
        steps::visible_steps(&self.answers)
    }

    pub fn current_index(&self) -> usize {
        steps::resolve_index(&self.visible_steps(), self.current)
    }

    /// The rendered step; falls back to the first visible step when the stored one is hidden.
    pub fn current_step(&self) -> &'static StepDefinition {
        let visible = self.visible_steps();
        let index = steps::resolve_index(&visible, self.current);
        visible
            .get(index)
            .copied()
            .unwrap_or_else(|| steps::definition(StepId::ContactInfo))
    }

    pub fn apply_field_change(
        &self,
        field: &str,
        value: Value,
    ) -> Result<IntakeSession, FieldChangeError> {
        let answers = apply_field_change(&self.answers, field, value)?;
        Ok(IntakeSession {
            answers,
            ..self.clone()
        })
    }

    pub fn validate_current(&self) -> ValidationReport {
        self.current_step().validate(&self.answers)
    }

    pub fn advance(&self) -> Advance {
        let visible = self.visible_steps();
        let index = steps::resolve_index(&visible, self.current);

        let report = visible[index].validate(&self.answers);
        if !report.is_valid() {
            return Advance::Blocked(report);
        }

        match visible.get(index + 1) {
            Some(next) => Advance::Moved(IntakeSession {
                current: next.id,
                ..self.clone()
            }),
            None => Advance::ReadyToSubmit,
        }
    }

    pub fn retreat(&self) -> IntakeSession {
        let visible = self.visible_steps();
        let index = steps::resolve_index(&visible, self.current);
        IntakeSession {
            current: visible[index.saturating_sub(1)].id,
            ..self.clone()
        }
    }

    /// Discard every answer and start over under the same session id.
    pub fn reset(&self) -> IntakeSession {
        IntakeSession::new(self.session_id.clone())
    }

    pub fn completion_percentage(&self) -> u8 {
        let total = self.visible_steps().len();
        let position = self.current_index() + 1;
        ((position * 200 + total) / (2 * total)) as u8
    }

    /// Progress bar fill: 90% at most until the final step.
    pub fn progress_percentage(&self) -> u8 {
        let total = self.visible_steps().len();
        let position = self.current_index() + 1;
        if position == total {
            100
        } else {
            (position * 90 / total) as u8
        }
    }

    pub fn view(&self, engine: &EvaluationEngine, schedule: &PricingSchedule) -> IntakeView {
        let visible = self.visible_steps();
        let index = steps::resolve_index(&visible, self.current);
        let assessment = engine.assess(&self.answers);
        let pricing = estimate(&self.answers, assessment.routing, schedule);
        let pricing_message = pricing.is_none().then(|| QUOTE_AFTER_REVIEW.to_string());

        IntakeView {
            session_id: self.session_id.clone(),
            record_id: self.record_id.clone(),
            current_step: StepView::from_definition(visible[index], index),
            steps: visible
                .iter()
                .enumerate()
                .map(|(position, step)| StepView::from_definition(step, position))
                .collect(),
            completion_percentage: self.completion_percentage(),
            progress_percentage: self.progress_percentage(),
            answers: self.answers.clone(),
            scores: assessment.scores,
            score_components: assessment.components,
            routing: RoutingProfile::new(assessment.routing, &self.answers),
            pricing,
            pricing_message,
            documents: document_checklist(&self.answers),
        }
    }

    pub fn snapshot(
        &self,
        engine: &EvaluationEngine,
        status: RecordStatus,
        saved_at: DateTime<Utc>,
    ) -> SessionSnapshot {
        let scores = engine.scores(&self.answers);
        let routing = engine.routing(&scores, &self.answers);
        SessionSnapshot {
            session_id: self.session_id.clone(),
            record_id: self.record_id.clone(),
            status,
            current_step: self.current_step().id,
            completion_percentage: match status {
                RecordStatus::Completed => 100,
                RecordStatus::InProgress => self.completion_percentage(),
            },
            answers: self.answers.clone(),
            scores,
            routing,
            reference: None,
            saved_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepView {
    pub id: StepId,
    pub title: String,
    pub description: String,
    pub required: bool,
    /// 1-based position among the visible steps.
    pub position: usize,
}

impl StepView {
    fn from_definition(step: &StepDefinition, index: usize) -> Self {
        Self {
            id: step.id,
            title: step.title.to_string(),
            description: step.description.to_string(),
            required: step.required,
            position: index + 1,
        }
    }
}

/// Everything a renderer needs for the current screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakeView {
    pub session_id: SessionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<RecordId>,
    pub current_step: StepView,
    pub steps: Vec<StepView>,
    pub completion_percentage: u8,
    pub progress_percentage: u8,
    pub answers: Answers,
    pub scores: Scores,
    pub score_components: Vec<ScoreComponent>,
    pub routing: RoutingProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PricingEstimate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing_message: Option<String>,
    pub documents: Vec<DocumentRequirement>,
}

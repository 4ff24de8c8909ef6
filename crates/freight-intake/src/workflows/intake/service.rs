use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::config::IntakeConfig;

use super::changes::FieldChangeError;
use super::domain::{RecordId, SessionId};
use super::evaluation::{EvaluationConfig, EvaluationEngine, RoutingProfile, Scores};
use super::pricing::{estimate, PricingEstimate, PricingSchedule, QUOTE_AFTER_REVIEW};
use super::repository::{RecordStatus, RecordStore, SessionSnapshot, StoreError};
use super::session::{Advance, IntakeSession, IntakeView};
use super::steps::StepId;
use super::validation::ValidationReport;

/// Service owning live sessions, the local snapshot cache, and the record store.
pub struct IntakeService<S> {
    store: Arc<S>,
    engine: EvaluationEngine,
    schedule: PricingSchedule,
    settings: IntakeConfig,
    sessions: Mutex<HashMap<SessionId, LiveSession>>,
    cache: Mutex<HashMap<RecordId, SessionSnapshot>>,
    clock: fn() -> DateTime<Utc>,
}

/// Live session plus the bookkeeping that serializes concurrent requests against it.
struct LiveSession {
    session: IntakeSession,
    revision: u64,
    submitting: bool,
}

impl LiveSession {
    fn new(session: IntakeSession) -> Self {
        Self {
            session,
            revision: 0,
            submitting: false,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn next_session_id(now: DateTime<Utc>) -> SessionId {
    let random = uuid::Uuid::new_v4().simple().to_string();
    SessionId(format!("session_{}_{}", now.timestamp_millis(), &random[..13]))
}

/// Quote reference in the `EF-YYYYMMDDHHmmss` format.
pub fn quote_reference(at: DateTime<Utc>) -> String {
    format!("EF-{}", at.format("%Y%m%d%H%M%S"))
}

/// Result of a successful forward transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NextOutcome {
    Moved { view: Box<IntakeView> },
    Submitted { receipt: SubmissionReceipt },
}

/// Confirmation handed back after the record store accepted the final submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReceipt {
    pub session_id: SessionId,
    pub record_id: RecordId,
    pub reference: String,
    pub submitted_at: DateTime<Utc>,
    pub scores: Scores,
    pub routing: RoutingProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PricingEstimate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing_message: Option<String>,
}

impl<S> IntakeService<S>
where
    S: RecordStore + 'static,
{
    pub fn new(store: Arc<S>, config: EvaluationConfig, settings: IntakeConfig) -> Self {
        Self {
            store,
            engine: EvaluationEngine::new(config),
            schedule: PricingSchedule::standard(),
            settings,
            sessions: Mutex::new(HashMap::new()),
            cache: Mutex::new(HashMap::new()),
            clock: Utc::now,
        }
    }

    pub fn with_schedule(mut self, schedule: PricingSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn engine(&self) -> &EvaluationEngine {
        &self.engine
    }

    pub fn schedule(&self) -> &PricingSchedule {
        &self.schedule
    }

    /// Open a new, empty session positioned on the first step.
    pub fn start(&self) -> IntakeView {
        let session = IntakeSession::new(next_session_id((self.clock)()));
        tracing::info!(session_id = %session.session_id, "intake session started");
        let view = self.render(&session);
        lock(&self.sessions).insert(session.session_id.clone(), LiveSession::new(session));
        view
    }

    pub fn view(&self, session_id: &SessionId) -> Result<IntakeView, IntakeServiceError> {
        let (session, _) = self.checkout(session_id)?;
        Ok(self.render(&session))
    }

    pub fn set_field(
        &self,
        session_id: &SessionId,
        field: &str,
        value: Value,
    ) -> Result<IntakeView, IntakeServiceError> {
        let view = self.update(session_id, |session| {
            session
                .apply_field_change(field, value)
                .map_err(IntakeServiceError::from)
        })?;
        tracing::debug!(session_id = %session_id, field, "answer updated");
        Ok(view)
    }

    /// Validate the current step, auto-save, and move on; the last step submits.
    ///
    /// Fails with [`IntakeServiceError::SessionBusy`] when another request changed the session
    /// while the auto-save was in flight; the other request's answers are kept.
    pub fn next(&self, session_id: &SessionId) -> Result<NextOutcome, IntakeServiceError> {
        let (session, revision) = self.checkout(session_id)?;
        match session.advance() {
            Advance::Blocked(report) => {
                tracing::debug!(
                    session_id = %session_id,
                    step = ?session.current_step().id,
                    errors = report.errors.len(),
                    "step validation blocked transition"
                );
                Err(IntakeServiceError::ValidationBlocked(report))
            }
            Advance::Moved(moved) => {
                let moved = self.autosave(moved);
                tracing::debug!(session_id = %session_id, step = ?moved.current, "moved to next step");
                let view = self.commit(moved, revision)?;
                Ok(NextOutcome::Moved {
                    view: Box::new(view),
                })
            }
            Advance::ReadyToSubmit => self
                .submit(session_id)
                .map(|receipt| NextOutcome::Submitted { receipt }),
        }
    }

    pub fn previous(&self, session_id: &SessionId) -> Result<IntakeView, IntakeServiceError> {
        self.update(session_id, |session| Ok(session.retreat()))
    }

    /// Submit from the final step. On failure the session stays put so the caller can retry.
    ///
    /// The session is claimed before the record store is called, so a second submit (or any
    /// edit) arriving meanwhile fails with [`IntakeServiceError::SessionBusy`].
    pub fn submit(
        &self,
        session_id: &SessionId,
    ) -> Result<SubmissionReceipt, IntakeServiceError> {
        let session = self.begin_submission(session_id)?;
        self.submit_session(session)
    }

    pub fn reset(&self, session_id: &SessionId) -> Result<IntakeView, IntakeServiceError> {
        let mut discarded = None;
        let view = self.update(session_id, |session| {
            discarded = session.record_id.clone();
            Ok(session.reset())
        })?;
        if let Some(record_id) = discarded {
            lock(&self.cache).remove(&record_id);
        }
        tracing::info!(session_id = %session_id, "intake session reset");
        Ok(view)
    }

    /// Resume an in-progress request previously saved to the record store.
    pub fn restore(&self, record_id: &RecordId) -> Result<IntakeView, IntakeServiceError> {
        let snapshot = match self.store.fetch(record_id) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return Err(RestoreError::NotFound(record_id.clone()).into()),
            Err(error) => self.cached_snapshot(record_id).ok_or_else(|| {
                tracing::warn!(record_id = %record_id, %error, "restore failed with no usable cache");
                RestoreError::Transient(error)
            })?,
        };

        if snapshot.status != RecordStatus::InProgress {
            return Err(RestoreError::Forbidden {
                record_id: record_id.clone(),
                status: snapshot.status,
            }
            .into());
        }

        let mut session = IntakeSession::restored(snapshot);
        session.record_id = Some(record_id.clone());
        tracing::info!(
            record_id = %record_id,
            session_id = %session.session_id,
            step = ?session.current,
            "intake session restored"
        );

        let view = self.render(&session);
        let mut sessions = lock(&self.sessions);
        match sessions.get_mut(&session.session_id) {
            Some(live) if live.submitting => {
                Err(IntakeServiceError::SessionBusy(session.session_id.clone()))
            }
            Some(live) => {
                live.session = session;
                live.revision += 1;
                Ok(view)
            }
            None => {
                sessions.insert(session.session_id.clone(), LiveSession::new(session));
                Ok(view)
            }
        }
    }

    fn cached_snapshot(&self, record_id: &RecordId) -> Option<SessionSnapshot> {
        let cache = lock(&self.cache);
        let snapshot = cache.get(record_id)?;
        let age = (self.clock)() - snapshot.saved_at;
        if age < self.settings.cache_ttl() {
            tracing::warn!(record_id = %record_id, "record store unavailable; restoring from local cache");
            Some(snapshot.clone())
        } else {
            tracing::debug!(record_id = %record_id, "cached snapshot expired");
            None
        }
    }

    fn submit_session(
        &self,
        session: IntakeSession,
    ) -> Result<SubmissionReceipt, IntakeServiceError> {
        let submitted_at = (self.clock)();
        let reference = quote_reference(submitted_at);
        let mut snapshot = session.snapshot(&self.engine, RecordStatus::Completed, submitted_at);
        snapshot.reference = Some(reference.clone());

        let record_id = match self.store.submit_final(&snapshot) {
            Ok(record_id) => record_id,
            Err(error) => {
                tracing::error!(session_id = %session.session_id, %error, "final submission failed");
                if let Some(live) = lock(&self.sessions).get_mut(&session.session_id) {
                    live.submitting = false;
                }
                return Err(IntakeServiceError::Submission(error));
            }
        };

        lock(&self.sessions).remove(&session.session_id);
        if let Some(previous) = &session.record_id {
            lock(&self.cache).remove(previous);
        }

        let pricing = estimate(&session.answers, snapshot.routing, &self.schedule);
        tracing::info!(
            session_id = %session.session_id,
            record_id = %record_id,
            reference = %reference,
            routing = ?snapshot.routing,
            "intake submitted"
        );

        Ok(SubmissionReceipt {
            session_id: session.session_id,
            record_id,
            reference,
            submitted_at,
            scores: snapshot.scores,
            routing: RoutingProfile::new(snapshot.routing, &session.answers),
            pricing_message: pricing.is_none().then(|| QUOTE_AFTER_REVIEW.to_string()),
            pricing,
        })
    }

    /// Best-effort save; failures are logged and never block navigation.
    fn autosave(&self, mut session: IntakeSession) -> IntakeSession {
        if self.settings.autosave_requires_email && session.answers.email.trim().is_empty() {
            tracing::debug!(session_id = %session.session_id, "auto-save skipped until email is entered");
            return session;
        }

        let snapshot = session.snapshot(&self.engine, RecordStatus::InProgress, (self.clock)());
        match self.store.save(&snapshot) {
            Ok(record_id) => {
                session.record_id = Some(record_id.clone());
                let mut snapshot = snapshot;
                snapshot.record_id = Some(record_id.clone());
                lock(&self.cache).insert(record_id, snapshot);
            }
            Err(error) => {
                tracing::warn!(session_id = %session.session_id, %error, "auto-save failed");
                if let Some(record_id) = session.record_id.clone() {
                    lock(&self.cache).insert(record_id, snapshot);
                }
            }
        }
        session
    }

    /// Copy of the live session and the revision it was read at.
    fn checkout(&self, session_id: &SessionId) -> Result<(IntakeSession, u64), IntakeServiceError> {
        let sessions = lock(&self.sessions);
        let live = sessions
            .get(session_id)
            .ok_or_else(|| IntakeServiceError::UnknownSession(session_id.clone()))?;
        if live.submitting {
            return Err(IntakeServiceError::SessionBusy(session_id.clone()));
        }
        Ok((live.session.clone(), live.revision))
    }

    /// Apply an in-memory transition atomically under the session lock.
    fn update<F>(&self, session_id: &SessionId, change: F) -> Result<IntakeView, IntakeServiceError>
    where
        F: FnOnce(&IntakeSession) -> Result<IntakeSession, IntakeServiceError>,
    {
        let updated = {
            let mut sessions = lock(&self.sessions);
            let live = sessions
                .get_mut(session_id)
                .ok_or_else(|| IntakeServiceError::UnknownSession(session_id.clone()))?;
            if live.submitting {
                return Err(IntakeServiceError::SessionBusy(session_id.clone()));
            }
            let updated = change(&live.session)?;
            live.session = updated.clone();
            live.revision += 1;
            updated
        };
        Ok(self.render(&updated))
    }

    /// Write back a session read at `revision`. A newer write wins; only the record id
    /// assigned by the store is carried over to it.
    fn commit(
        &self,
        session: IntakeSession,
        revision: u64,
    ) -> Result<IntakeView, IntakeServiceError> {
        {
            let mut sessions = lock(&self.sessions);
            let live = sessions
                .get_mut(&session.session_id)
                .ok_or_else(|| IntakeServiceError::UnknownSession(session.session_id.clone()))?;
            if live.submitting || live.revision != revision {
                if live.session.record_id.is_none() {
                    live.session.record_id = session.record_id.clone();
                }
                tracing::warn!(
                    session_id = %session.session_id,
                    "session changed during transition; discarding stale write"
                );
                return Err(IntakeServiceError::SessionBusy(session.session_id.clone()));
            }
            live.session = session.clone();
            live.revision += 1;
        }
        Ok(self.render(&session))
    }

    /// Claim the session for final submission.
    fn begin_submission(&self, session_id: &SessionId) -> Result<IntakeSession, IntakeServiceError> {
        let mut sessions = lock(&self.sessions);
        let live = sessions
            .get_mut(session_id)
            .ok_or_else(|| IntakeServiceError::UnknownSession(session_id.clone()))?;
        if live.submitting {
            return Err(IntakeServiceError::SessionBusy(session_id.clone()));
        }
        match live.session.advance() {
            Advance::ReadyToSubmit => {
                live.submitting = true;
                Ok(live.session.clone())
            }
            Advance::Blocked(report) => Err(IntakeServiceError::ValidationBlocked(report)),
            Advance::Moved(_) => Err(IntakeServiceError::NotReadyToSubmit(
                live.session.current_step().id,
            )),
        }
    }

    fn render(&self, session: &IntakeSession) -> IntakeView {
        session.view(&self.engine, &self.schedule)
    }
}

/// Why a saved request could not be resumed.
#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    #[error("no saved request {0}")]
    NotFound(RecordId),
    #[error("saved request {record_id} is {} and cannot be resumed", .status.label())]
    Forbidden {
        record_id: RecordId,
        status: RecordStatus,
    },
    #[error("record store unavailable: {0}")]
    Transient(#[source] StoreError),
}

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum IntakeServiceError {
    #[error("unknown intake session {0}")]
    UnknownSession(SessionId),
    #[error(transparent)]
    FieldChange(#[from] FieldChangeError),
    #[error("the current step has {} invalid field(s)", .0.errors.len())]
    ValidationBlocked(ValidationReport),
    #[error("cannot submit from step {0:?}")]
    NotReadyToSubmit(StepId),
    #[error("intake session {0} is being updated by another request")]
    SessionBusy(SessionId),
    #[error("submission failed: {0}")]
    Submission(#[source] StoreError),
    #[error(transparent)]
    Restore(#[from] RestoreError),
}

impl IntakeServiceError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            IntakeServiceError::Submission(_)
                | IntakeServiceError::SessionBusy(_)
                | IntakeServiceError::Restore(RestoreError::Transient(_))
        )
    }
}

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::domain::{RecordId, SessionId};
use super::repository::RecordStore;
use super::service::{IntakeService, IntakeServiceError, NextOutcome, RestoreError};

pub const SUBMISSION_FALLBACK: &str = "We encountered an issue submitting your form. Please try again or contact us directly at sales@easyfreight.co.nz or +64 (9) 215-4654.";

pub const START_FRESH_NOTICE: &str =
    "We couldn't resume that quote request. Please start a new one.";

/// Body of a single answer update.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldUpdate {
    pub field: String,
    #[serde(default)]
    pub value: Value,
}

/// Router builder exposing the wizard transitions over HTTP.
pub fn intake_router<S>(service: Arc<IntakeService<S>>) -> Router
where
    S: RecordStore + 'static,
{
    Router::new()
        .route("/api/v1/intake/sessions", post(start_handler::<S>))
        .route(
            "/api/v1/intake/sessions/:session_id",
            get(view_handler::<S>),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/fields",
            patch(field_handler::<S>),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/next",
            post(next_handler::<S>),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/previous",
            post(previous_handler::<S>),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/submit",
            post(submit_handler::<S>),
        )
        .route(
            "/api/v1/intake/sessions/:session_id/reset",
            post(reset_handler::<S>),
        )
        .route(
            "/api/v1/intake/restore/:record_id",
            post(restore_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn start_handler<S>(State(service): State<Arc<IntakeService<S>>>) -> Response
where
    S: RecordStore + 'static,
{
    let view = service.start();
    (StatusCode::CREATED, axum::Json(view)).into_response()
}

pub(crate) async fn view_handler<S>(
    State(service): State<Arc<IntakeService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    match service.view(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn field_handler<S>(
    State(service): State<Arc<IntakeService<S>>>,
    Path(session_id): Path<String>,
    axum::Json(update): axum::Json<FieldUpdate>,
) -> Response
where
    S: RecordStore + 'static,
{
    match service.set_field(&SessionId(session_id), &update.field, update.value) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn next_handler<S>(
    State(service): State<Arc<IntakeService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    match service.next(&SessionId(session_id)) {
        Ok(outcome @ NextOutcome::Moved { .. }) => {
            (StatusCode::OK, axum::Json(outcome)).into_response()
        }
        Ok(outcome @ NextOutcome::Submitted { .. }) => {
            (StatusCode::CREATED, axum::Json(outcome)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn previous_handler<S>(
    State(service): State<Arc<IntakeService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    match service.previous(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<IntakeService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    match service.submit(&SessionId(session_id)) {
        Ok(receipt) => (StatusCode::CREATED, axum::Json(receipt)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reset_handler<S>(
    State(service): State<Arc<IntakeService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    match service.reset(&SessionId(session_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn restore_handler<S>(
    State(service): State<Arc<IntakeService<S>>>,
    Path(record_id): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    match service.restore(&RecordId(record_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

/// Map service failures onto the status codes the wizard front end understands.
pub fn error_response(error: IntakeServiceError) -> Response {
    let retryable = error.is_retryable();
    match error {
        IntakeServiceError::UnknownSession(session_id) => {
            let payload = json!({
                "error": "unknown intake session",
                "session_id": session_id,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        IntakeServiceError::ValidationBlocked(report) => {
            let payload = json!({
                "error": "please correct the highlighted fields",
                "errors": report.errors,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        IntakeServiceError::FieldChange(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        IntakeServiceError::NotReadyToSubmit(step) => {
            let payload = json!({
                "error": "submission is only available from the review step",
                "current_step": step,
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        IntakeServiceError::SessionBusy(session_id) => {
            let payload = json!({
                "error": "this request is already being processed; reload and try again",
                "session_id": session_id,
                "retryable": retryable,
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        IntakeServiceError::Submission(error) => {
            let payload = json!({
                "error": error.to_string(),
                "retryable": retryable,
                "fallback": SUBMISSION_FALLBACK,
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        IntakeServiceError::Restore(error) => {
            let status = match &error {
                RestoreError::NotFound(_) => StatusCode::NOT_FOUND,
                RestoreError::Forbidden { .. } => StatusCode::FORBIDDEN,
                RestoreError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
            };
            let payload = json!({
                "error": error.to_string(),
                "notice": START_FRESH_NOTICE,
                "retryable": retryable,
            });
            (status, axum::Json(payload)).into_response()
        }
    }
}

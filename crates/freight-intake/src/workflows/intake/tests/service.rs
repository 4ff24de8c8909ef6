use super::common::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use crate::config::IntakeConfig;
use crate::workflows::intake::domain::{CargoType, GoodsTiming, RecordId, SessionId};
use crate::workflows::intake::evaluation::EvaluationConfig;
use crate::workflows::intake::money::Money;
use crate::workflows::intake::pricing::PricingSchedule;
use crate::workflows::intake::repository::{RecordStatus, RecordStore};
use crate::workflows::intake::service::{
    IntakeService, IntakeServiceError, NextOutcome, RestoreError,
};
use crate::workflows::intake::steps::StepId;

fn advance_times<S: RecordStore + 'static>(
    service: &IntakeService<S>,
    session_id: &SessionId,
    times: usize,
) {
    for _ in 0..times {
        match service.next(session_id) {
            Ok(NextOutcome::Moved { .. }) => {}
            other => panic!("expected move, got {other:?}"),
        }
    }
}

#[test]
fn next_blocks_on_invalid_step_without_side_effects() {
    let (service, store) = build_service();
    let view = service.start();
    let session_id = view.session_id.clone();

    match service.next(&session_id) {
        Err(IntakeServiceError::ValidationBlocked(report)) => {
            assert!(report.error_for("first_name").is_some());
        }
        other => panic!("expected validation block, got {other:?}"),
    }

    let after = service.view(&session_id).expect("session still live");
    assert_eq!(after.current_step.id, StepId::ContactInfo);
    assert_eq!(after.answers, view.answers);
    assert_eq!(after.scores, view.scores);
    assert_eq!(store.saves(), 0);
}

#[test]
fn full_walkthrough_submits_with_reference() {
    let (service, store) = build_service();
    let session_id = service.start().session_id;
    fill(&service, &session_id, arrived_courier_import());

    let steps = arrived_courier_steps();
    advance_times(&service, &session_id, steps.len() - 1);
    assert_eq!(
        service.view(&session_id).expect("live").current_step.id,
        StepId::Review
    );

    let receipt = match service.next(&session_id) {
        Ok(NextOutcome::Submitted { receipt }) => receipt,
        other => panic!("expected submission, got {other:?}"),
    };

    assert!(receipt.reference.starts_with("EF-"));
    assert_eq!(receipt.reference.len(), "EF-".len() + 14);
    assert_eq!(receipt.routing.label, "Urgent priority");
    assert_eq!(
        receipt.pricing.as_ref().map(|p| p.total.to_decimal_string()),
        Some("335.80".to_string())
    );

    let submissions = store.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].status, RecordStatus::Completed);
    assert_eq!(submissions[0].completion_percentage, 100);
    assert_eq!(submissions[0].reference.as_deref(), Some(receipt.reference.as_str()));

    assert!(matches!(
        service.view(&session_id),
        Err(IntakeServiceError::UnknownSession(_))
    ));
}

#[test]
fn autosave_assigns_record_and_keeps_it() {
    let (service, store) = build_service();
    let session_id = service.start().session_id;
    fill(&service, &session_id, arrived_courier_import());

    advance_times(&service, &session_id, 2);
    let view = service.view(&session_id).expect("live");
    let record_id = view.record_id.expect("record assigned after auto-save");
    assert_eq!(store.saves(), 1);

    let stored = store
        .fetch(&record_id)
        .expect("fetch")
        .expect("snapshot stored");
    assert_eq!(stored.status, RecordStatus::InProgress);
    assert_eq!(stored.current_step, StepId::GoodsLocation);
}

#[test]
fn autosave_failure_never_blocks_navigation() {
    let (service, store) = build_service();
    store.fail_save.store(true, Ordering::Relaxed);
    let session_id = service.start().session_id;
    fill(&service, &session_id, arrived_courier_import());

    advance_times(&service, &session_id, 3);
    let view = service.view(&session_id).expect("live");
    assert_eq!(view.current_step.id, StepId::ShippingMethod);
    assert!(view.record_id.is_none());
    assert_eq!(store.saves(), 0);
}

#[test]
fn failed_submission_is_retryable() {
    let (service, store) = build_service();
    let session_id = service.start().session_id;
    fill(&service, &session_id, arrived_courier_import());
    advance_times(&service, &session_id, arrived_courier_steps().len() - 1);

    store.fail_submit.store(true, Ordering::Relaxed);
    let error = service.submit(&session_id).expect_err("store is down");
    assert!(matches!(error, IntakeServiceError::Submission(_)));
    assert!(error.is_retryable());
    assert_eq!(
        service.view(&session_id).expect("still live").current_step.id,
        StepId::Review
    );

    store.fail_submit.store(false, Ordering::Relaxed);
    let receipt = service.submit(&session_id).expect("retry succeeds");
    assert_eq!(receipt.session_id, session_id);
}

#[test]
fn submit_requires_review_step() {
    let (service, _) = build_service();
    let session_id = service.start().session_id;
    fill(&service, &session_id, arrived_courier_import());

    match service.submit(&session_id) {
        Err(IntakeServiceError::NotReadyToSubmit(StepId::ContactInfo)) => {}
        other => panic!("expected not-ready error, got {other:?}"),
    }
}

#[test]
fn rejected_field_change_keeps_answers() {
    let (service, _) = build_service();
    let session_id = service.start().session_id;

    let error = service
        .set_field(&session_id, "shipment_method", json!("pigeon"))
        .expect_err("unknown method");
    assert!(matches!(error, IntakeServiceError::FieldChange(_)));
    assert!(service
        .view(&session_id)
        .expect("live")
        .answers
        .shipment_method
        .is_none());
}

#[test]
fn reset_discards_answers() {
    let (service, _) = build_service();
    let session_id = service.start().session_id;
    fill(&service, &session_id, arrived_courier_import());
    advance_times(&service, &session_id, 2);

    let view = service.reset(&session_id).expect("reset");
    assert_eq!(view.current_step.id, StepId::ContactInfo);
    assert!(view.answers.email.is_empty());
    assert!(view.record_id.is_none());
}

#[test]
fn restore_resumes_saved_session() {
    let (service, _) = build_service();
    let session_id = service.start().session_id;
    fill(&service, &session_id, arrived_courier_import());
    advance_times(&service, &session_id, 4);
    let before = service.view(&session_id).expect("live");
    let record_id = before.record_id.clone().expect("saved");

    let (fresh, _) = build_service();
    let restored = fresh.restore(&record_id);
    assert!(matches!(
        restored,
        Err(IntakeServiceError::Restore(RestoreError::NotFound(_)))
    ));

    let restored = service.restore(&record_id).expect("restore");
    assert_eq!(restored.current_step.id, before.current_step.id);
    assert_eq!(restored.scores, before.scores);
    assert_eq!(restored.routing, before.routing);
    assert_eq!(restored.record_id, Some(record_id));
}

#[test]
fn restore_rejects_completed_requests() {
    let (service, store) = build_service();
    let answers = import_with(GoodsTiming::Arrived, CargoType::GeneralGoods);
    store.insert(
        "rec-done",
        snapshot_with_status(answers, RecordStatus::Completed),
    );

    match service.restore(&RecordId("rec-done".to_string())) {
        Err(IntakeServiceError::Restore(RestoreError::Forbidden { status, .. })) => {
            assert_eq!(status, RecordStatus::Completed);
        }
        other => panic!("expected forbidden restore, got {other:?}"),
    }
}

#[test]
fn transient_restore_falls_back_to_fresh_cache() {
    let (service, store) = build_service();
    let session_id = service.start().session_id;
    fill(&service, &session_id, arrived_courier_import());
    advance_times(&service, &session_id, 3);
    let record_id = service
        .view(&session_id)
        .expect("live")
        .record_id
        .expect("saved");

    store.fail_fetch.store(true, Ordering::Relaxed);
    let restored = service.restore(&record_id).expect("cache fallback");
    assert_eq!(restored.current_step.id, StepId::ShippingMethod);

    match service.restore(&RecordId("rec-unknown".to_string())) {
        Err(error @ IntakeServiceError::Restore(RestoreError::Transient(_))) => {
            assert!(error.is_retryable());
        }
        other => panic!("expected transient restore error, got {other:?}"),
    }
}

#[test]
fn expired_cache_is_not_used() {
    let (service, store) = build_service_with(IntakeConfig {
        cache_ttl_hours: 0,
        autosave_requires_email: true,
    });
    let session_id = service.start().session_id;
    fill(&service, &session_id, arrived_courier_import());
    advance_times(&service, &session_id, 2);
    let record_id = service
        .view(&session_id)
        .expect("live")
        .record_id
        .expect("saved");

    store.fail_fetch.store(true, Ordering::Relaxed);
    assert!(matches!(
        service.restore(&record_id),
        Err(IntakeServiceError::Restore(RestoreError::Transient(_)))
    ));
}

fn launch_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53)
        .single()
        .expect("valid timestamp")
}

#[test]
fn reference_and_pricing_follow_injected_clock_and_schedule() {
    let store = Arc::new(MemoryStore::default());
    let schedule = PricingSchedule {
        base_fee: Money::from_dollars(250),
        ..PricingSchedule::standard()
    };
    let service = IntakeService::new(
        store.clone(),
        EvaluationConfig::default(),
        IntakeConfig::default(),
    )
    .with_schedule(schedule.clone())
    .with_clock(launch_morning);
    assert_eq!(service.schedule(), &schedule);
    assert_eq!(service.engine().config().urgent_threshold, 8);

    let session_id = service.start().session_id;
    assert!(session_id.as_str().starts_with("session_1773480413000_"));
    fill(&service, &session_id, arrived_courier_import());
    advance_times(&service, &session_id, arrived_courier_steps().len() - 1);

    let receipt = service.submit(&session_id).expect("submit");
    assert_eq!(receipt.reference, "EF-20260314092653");
    assert_eq!(receipt.submitted_at, launch_morning());
    assert_eq!(
        receipt.pricing.map(|p| p.total.to_decimal_string()),
        Some("396.75".to_string())
    );
    assert_eq!(store.submissions()[0].saved_at, launch_morning());
}

fn gated_service(hold: Hold) -> (Arc<IntakeService<GatedStore>>, Arc<GatedStore>, GateControl) {
    let (store, gate) = GatedStore::new(hold);
    let store = Arc::new(store);
    let service = IntakeService::new(
        store.clone(),
        EvaluationConfig::default(),
        IntakeConfig::default(),
    );
    (Arc::new(service), store, gate)
}

#[test]
fn concurrent_submit_reaches_the_store_once() {
    let (service, store, gate) = gated_service(Hold::SubmitFinal);
    let session_id = service.start().session_id;
    fill(&service, &session_id, arrived_courier_import());
    advance_times(&service, &session_id, arrived_courier_steps().len() - 1);

    let first = {
        let service = Arc::clone(&service);
        let session_id = session_id.clone();
        thread::spawn(move || service.submit(&session_id))
    };
    gate.wait_until_held();

    let second = service.submit(&session_id).expect_err("session already claimed");
    assert!(matches!(second, IntakeServiceError::SessionBusy(_)));
    assert!(second.is_retryable());
    assert!(matches!(
        service.next(&session_id),
        Err(IntakeServiceError::SessionBusy(_))
    ));
    assert!(matches!(
        service.set_field(&session_id, "phone", json!("+64 9 555 0000")),
        Err(IntakeServiceError::SessionBusy(_))
    ));

    gate.release();
    let receipt = first
        .join()
        .expect("submit thread")
        .expect("first submit succeeds");
    assert_eq!(receipt.session_id, session_id);
    assert_eq!(store.inner.submissions().len(), 1);
    assert!(matches!(
        service.submit(&session_id),
        Err(IntakeServiceError::UnknownSession(_))
    ));
}

#[test]
fn edit_made_during_autosave_survives_the_transition() {
    let (service, _store, gate) = gated_service(Hold::Save);
    let session_id = service.start().session_id;
    fill(&service, &session_id, arrived_courier_import());

    let pending = {
        let service = Arc::clone(&service);
        let session_id = session_id.clone();
        thread::spawn(move || service.next(&session_id))
    };
    gate.wait_until_held();

    let edited = service
        .set_field(&session_id, "company_name", json!("Totara Trading"))
        .expect("edit lands while saving");
    assert_eq!(edited.current_step.id, StepId::ContactInfo);

    gate.release();
    let outcome = pending.join().expect("next thread");
    assert!(matches!(outcome, Err(IntakeServiceError::SessionBusy(_))));

    let view = service.view(&session_id).expect("live");
    assert_eq!(view.answers.company_name, "Totara Trading");
    assert_eq!(view.current_step.id, StepId::ContactInfo);
    assert!(view.record_id.is_some(), "record assigned by the save is kept");
}

use freight_intake::workflows::intake::{RecordId, RecordStore, SessionSnapshot, StoreError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local record store standing in for the CRM until a real adapter is wired up.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRecordStore {
    records: Arc<Mutex<HashMap<RecordId, SessionSnapshot>>>,
    sequence: Arc<AtomicU64>,
}

impl InMemoryRecordStore {
    fn upsert(&self, snapshot: &SessionSnapshot) -> RecordId {
        let record_id = snapshot.record_id.clone().unwrap_or_else(|| {
            let next = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
            RecordId(format!("rec-{next:06}"))
        });
        let mut stored = snapshot.clone();
        stored.record_id = Some(record_id.clone());
        self.records
            .lock()
            .expect("record store mutex poisoned")
            .insert(record_id.clone(), stored);
        record_id
    }

    pub(crate) fn len(&self) -> usize {
        self.records
            .lock()
            .expect("record store mutex poisoned")
            .len()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn save(&self, snapshot: &SessionSnapshot) -> Result<RecordId, StoreError> {
        Ok(self.upsert(snapshot))
    }

    fn submit_final(&self, snapshot: &SessionSnapshot) -> Result<RecordId, StoreError> {
        Ok(self.upsert(snapshot))
    }

    fn fetch(&self, record_id: &RecordId) -> Result<Option<SessionSnapshot>, StoreError> {
        let guard = self.records.lock().expect("record store mutex poisoned");
        Ok(guard.get(record_id).cloned())
    }
}

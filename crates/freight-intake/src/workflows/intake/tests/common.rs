use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use chrono::Utc;
use proptest::prelude::*;
use serde_json::{json, Value};

use crate::config::IntakeConfig;
use crate::workflows::intake::domain::{
    Answers, ArrivalMethod, CargoType, ContainerType, CustomerType, CustomsCodeStatus,
    DestinationCountry, Direction, DocumentId, DocumentStatus, GoodsTiming, RecordId, SessionId,
    ShipmentMethod, ShippingPayment,
};
use crate::workflows::intake::evaluation::{EvaluationConfig, EvaluationEngine};
use crate::workflows::intake::money::Money;
use crate::workflows::intake::repository::{
    RecordStatus, RecordStore, SessionSnapshot, StoreError,
};
use crate::workflows::intake::router::intake_router;
use crate::workflows::intake::service::IntakeService;
use crate::workflows::intake::steps::StepId;

pub(super) fn engine() -> EvaluationEngine {
    EvaluationEngine::new(EvaluationConfig::default())
}

pub(super) fn contact() -> Answers {
    Answers {
        first_name: "Hemi".to_string(),
        last_name: "Walker".to_string(),
        email: "hemi@kauri-imports.co.nz".to_string(),
        phone: "+64 21 555 0142".to_string(),
        consent_checkbox: true,
        ..Answers::default()
    }
}

pub(super) fn import_with(timing: GoodsTiming, cargo: CargoType) -> Answers {
    Answers {
        direction: Some(Direction::Import),
        customer_type: Some(CustomerType::Business),
        company_name: "Kauri Imports Ltd".to_string(),
        goods_location: Some(timing),
        cargo_type: Some(cargo),
        ..contact()
    }
}

/// Field updates that satisfy every visible step for an arrived courier import.
pub(super) fn arrived_courier_import() -> Vec<(&'static str, Value)> {
    vec![
        ("first_name", json!("Hemi")),
        ("last_name", json!("Walker")),
        ("email", json!("hemi@kauri-imports.co.nz")),
        ("phone", json!("+64 21 555 0142")),
        ("consent_checkbox", json!(true)),
        ("direction", json!("import")),
        ("customer_type", json!("personal")),
        ("goods_location", json!("arrived")),
        ("shipment_method", json!("courier")),
        ("needs_port_delivery", json!("no")),
        ("cargo_type", json!("general_goods")),
        ("document_status.commercial_invoice", json!("upload")),
        ("customs_code_status", json!("need_help")),
    ]
}

/// Steps visible for [`arrived_courier_import`], in order.
pub(super) fn arrived_courier_steps() -> Vec<StepId> {
    vec![
        StepId::ContactInfo,
        StepId::Classification,
        StepId::GoodsLocation,
        StepId::ShippingMethod,
        StepId::DeliveryOptions,
        StepId::CargoType,
        StepId::DocumentUpload,
        StepId::CustomsCode,
        StepId::Review,
    ]
}

pub(super) fn fill<S: RecordStore + 'static>(
    service: &IntakeService<S>,
    session_id: &SessionId,
    fields: Vec<(&'static str, Value)>,
) {
    for (field, value) in fields {
        service
            .set_field(session_id, field, value)
            .unwrap_or_else(|err| panic!("field {field} rejected: {err}"));
    }
}

pub(super) fn build_service() -> (IntakeService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = IntakeService::new(
        store.clone(),
        EvaluationConfig::default(),
        IntakeConfig::default(),
    );
    (service, store)
}

pub(super) fn build_service_with(
    settings: IntakeConfig,
) -> (IntakeService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = IntakeService::new(store.clone(), EvaluationConfig::default(), settings);
    (service, store)
}

/// In-memory record store with switches for injecting failures.
#[derive(Default)]
pub(super) struct MemoryStore {
    pub(super) records: Mutex<HashMap<RecordId, SessionSnapshot>>,
    pub(super) submissions: Mutex<Vec<SessionSnapshot>>,
    sequence: AtomicU64,
    pub(super) fail_save: AtomicBool,
    pub(super) fail_submit: AtomicBool,
    pub(super) fail_fetch: AtomicBool,
}

impl MemoryStore {
    pub(super) fn saves(&self) -> usize {
        self.records.lock().expect("store mutex poisoned").len()
    }

    pub(super) fn submissions(&self) -> Vec<SessionSnapshot> {
        self.submissions
            .lock()
            .expect("store mutex poisoned")
            .clone()
    }

    pub(super) fn insert(&self, record_id: &str, snapshot: SessionSnapshot) {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .insert(RecordId(record_id.to_string()), snapshot);
    }

    fn assign(&self, snapshot: &SessionSnapshot) -> RecordId {
        snapshot.record_id.clone().unwrap_or_else(|| {
            let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
            RecordId(format!("rec{id:06}"))
        })
    }
}

impl RecordStore for MemoryStore {
    fn save(&self, snapshot: &SessionSnapshot) -> Result<RecordId, StoreError> {
        if self.fail_save.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("save timed out".to_string()));
        }
        let record_id = self.assign(snapshot);
        let mut stored = snapshot.clone();
        stored.record_id = Some(record_id.clone());
        self.records
            .lock()
            .expect("store mutex poisoned")
            .insert(record_id.clone(), stored);
        Ok(record_id)
    }

    fn submit_final(&self, snapshot: &SessionSnapshot) -> Result<RecordId, StoreError> {
        if self.fail_submit.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("gateway timeout".to_string()));
        }
        let record_id = self.assign(snapshot);
        let mut stored = snapshot.clone();
        stored.record_id = Some(record_id.clone());
        self.records
            .lock()
            .expect("store mutex poisoned")
            .insert(record_id.clone(), stored.clone());
        self.submissions
            .lock()
            .expect("store mutex poisoned")
            .push(stored);
        Ok(record_id)
    }

    fn fetch(&self, record_id: &RecordId) -> Result<Option<SessionSnapshot>, StoreError> {
        if self.fail_fetch.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        Ok(self
            .records
            .lock()
            .expect("store mutex poisoned")
            .get(record_id)
            .cloned())
    }
}

/// Store call that parks until the test releases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Hold {
    Save,
    SubmitFinal,
}

/// Wraps [`MemoryStore`] and blocks one kind of call so tests can interleave requests.
pub(super) struct GatedStore {
    pub(super) inner: MemoryStore,
    hold: Hold,
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

/// Handles for a [`GatedStore`]: wait for the held call to start, then let it finish.
pub(super) struct GateControl {
    entered: mpsc::Receiver<()>,
    release: mpsc::Sender<()>,
}

impl GateControl {
    pub(super) fn wait_until_held(&self) {
        self.entered
            .recv_timeout(Duration::from_secs(5))
            .expect("store call never started");
    }

    pub(super) fn release(&self) {
        self.release.send(()).expect("store call still parked");
    }
}

impl GatedStore {
    pub(super) fn new(hold: Hold) -> (Self, GateControl) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let store = Self {
            inner: MemoryStore::default(),
            hold,
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        };
        let control = GateControl {
            entered: entered_rx,
            release: release_tx,
        };
        (store, control)
    }

    fn park(&self, call: Hold) {
        if call != self.hold {
            return;
        }
        self.entered
            .lock()
            .expect("gate mutex poisoned")
            .send(())
            .expect("test dropped the gate");
        self.release
            .lock()
            .expect("gate mutex poisoned")
            .recv_timeout(Duration::from_secs(5))
            .expect("test never released the gate");
    }
}

impl RecordStore for GatedStore {
    fn save(&self, snapshot: &SessionSnapshot) -> Result<RecordId, StoreError> {
        self.park(Hold::Save);
        self.inner.save(snapshot)
    }

    fn submit_final(&self, snapshot: &SessionSnapshot) -> Result<RecordId, StoreError> {
        self.park(Hold::SubmitFinal);
        self.inner.submit_final(snapshot)
    }

    fn fetch(&self, record_id: &RecordId) -> Result<Option<SessionSnapshot>, StoreError> {
        self.inner.fetch(record_id)
    }
}

pub(super) fn snapshot_with_status(answers: Answers, status: RecordStatus) -> SessionSnapshot {
    let engine = engine();
    let scores = engine.scores(&answers);
    SessionSnapshot {
        session_id: SessionId("session_1700000000000_fixture".to_string()),
        record_id: None,
        status,
        current_step: StepId::CargoType,
        completion_percentage: 50,
        routing: engine.routing(&scores, &answers),
        scores,
        answers,
        reference: None,
        saved_at: Utc::now(),
    }
}

pub(super) fn router_with_service(service: IntakeService<MemoryStore>) -> axum::Router {
    intake_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

fn arb_timing() -> impl Strategy<Value = GoodsTiming> {
    prop_oneof![
        Just(GoodsTiming::Arrived),
        Just(GoodsTiming::WithinTwoDays),
        Just(GoodsTiming::WithinWeek),
        Just(GoodsTiming::MoreThanWeek),
        Just(GoodsTiming::NotShippedYet),
        Just(GoodsTiming::Planning),
        Just(GoodsTiming::OrderedNotShipped),
    ]
}

fn arb_cargo() -> impl Strategy<Value = CargoType> {
    prop_oneof![
        Just(CargoType::GeneralGoods),
        Just(CargoType::FoodBeverages),
        Just(CargoType::PersonalEffects),
        Just(CargoType::VehiclesMachinery),
        Just(CargoType::ChemicalsDangerous),
        Just(CargoType::DocumentsSamples),
        Just(CargoType::FrozenGoods),
        Just(CargoType::PerishableGoods),
        Just(CargoType::Other),
    ]
}

fn arb_method() -> impl Strategy<Value = ShipmentMethod> {
    prop_oneof![
        Just(ShipmentMethod::SeaFreight),
        Just(ShipmentMethod::AirFreight),
        Just(ShipmentMethod::Courier),
        Just(ShipmentMethod::NotSure),
    ]
}

fn arb_payment() -> impl Strategy<Value = ShippingPayment> {
    prop_oneof![
        Just(ShippingPayment::SupplierPaysCif),
        Just(ShippingPayment::CustomerPaysFob),
        Just(ShippingPayment::CustomerPaysExw),
        Just(ShippingPayment::NotSure),
    ]
}

fn arb_destination() -> impl Strategy<Value = DestinationCountry> {
    prop_oneof![
        Just(DestinationCountry::China),
        Just(DestinationCountry::Usa),
        Just(DestinationCountry::Australia),
        Just(DestinationCountry::Other),
    ]
}

fn arb_documents() -> impl Strategy<Value = Vec<(DocumentId, DocumentStatus)>> {
    let document = prop::sample::select(DocumentId::ALL.to_vec());
    let status = prop_oneof![
        Just(DocumentStatus::Upload),
        Just(DocumentStatus::DontHave),
        Just(DocumentStatus::NeedHelp),
    ];
    prop::collection::vec((document, status), 0..6)
}

/// Arbitrary, possibly contradictory answer records.
pub(super) fn arb_answers() -> impl Strategy<Value = Answers> {
    let classification = (
        prop::option::of(prop_oneof![Just(Direction::Import), Just(Direction::Export)]),
        prop::option::of(prop_oneof![
            Just(CustomerType::Business),
            Just(CustomerType::Personal)
        ]),
        prop::option::of(arb_timing()),
        prop::option::of(arb_cargo()),
        prop::option::of(arb_method()),
        prop::option::of(arb_payment()),
    );
    let extras = (
        prop::option::of(prop_oneof![Just(ContainerType::Lcl), Just(ContainerType::Fcl)]),
        prop::option::of(prop_oneof![
            Just(ArrivalMethod::Courier),
            Just(ArrivalMethod::SeaPort)
        ]),
        prop::option::of(arb_destination()),
        prop::option::of((0i64..50_000_000).prop_map(Money::from_cents)),
        prop::option::of(any::<bool>()),
        prop::option::of(prop_oneof![
            Just(CustomsCodeStatus::HaveCode),
            Just(CustomsCodeStatus::NeedHelp)
        ]),
        any::<bool>(),
        arb_documents(),
    );

    (classification, extras).prop_map(
        |(
            (direction, customer_type, timing, cargo, method, payment),
            (container, arrival, destination, value, delivery, customs, with_contact, documents),
        )| {
            let base = if with_contact {
                contact()
            } else {
                Answers::default()
            };
            Answers {
                direction,
                customer_type,
                goods_location: timing,
                cargo_type: cargo,
                shipment_method: method,
                shipping_payment: payment,
                container_type: container,
                arrival_method: arrival,
                destination_country: destination,
                declared_value: value,
                needs_port_delivery: delivery,
                customs_code_status: customs,
                document_status: documents.into_iter().collect(),
                ..base
            }
        },
    )
}

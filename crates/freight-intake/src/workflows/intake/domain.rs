use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::money::Money;

/// Identifier for a live intake session (`session_<millis>_<random>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier assigned by the external record store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Import,
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerType {
    Business,
    Personal,
}

/// Where import goods currently are; drives urgency and which steps remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GoodsTiming {
    #[serde(rename = "arrived")]
    Arrived,
    #[serde(rename = "1_2_days")]
    WithinTwoDays,
    #[serde(rename = "1_week")]
    WithinWeek,
    #[serde(rename = "more_than_week")]
    MoreThanWeek,
    #[serde(rename = "not_shipped_yet")]
    NotShippedYet,
    #[serde(rename = "planning")]
    Planning,
    #[serde(rename = "ordered_not_shipped")]
    OrderedNotShipped,
}

impl GoodsTiming {
    /// Planning-only states skip the shipping and delivery questions entirely.
    pub const fn is_planning_only(self) -> bool {
        matches!(self, GoodsTiming::Planning | GoodsTiming::OrderedNotShipped)
    }

    pub const fn label(self) -> &'static str {
        match self {
            GoodsTiming::Arrived => "Already arrived",
            GoodsTiming::WithinTwoDays => "Arriving within 48 hours",
            GoodsTiming::WithinWeek => "Arriving within a week",
            GoodsTiming::MoreThanWeek => "Arriving in more than a week",
            GoodsTiming::NotShippedYet => "Not shipped yet",
            GoodsTiming::Planning => "Planning",
            GoodsTiming::OrderedNotShipped => "Ordered, not shipped",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalMethod {
    SeaPort,
    AirFreight,
    Courier,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrivalTimeline {
    #[serde(rename = "within_week")]
    WithinWeek,
    #[serde(rename = "1_4_weeks")]
    OneToFourWeeks,
    #[serde(rename = "over_month")]
    OverMonth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentMethod {
    SeaFreight,
    AirFreight,
    Courier,
    NotSure,
}

impl ShipmentMethod {
    pub const fn label(self) -> &'static str {
        match self {
            ShipmentMethod::SeaFreight => "Sea freight",
            ShipmentMethod::AirFreight => "Air freight",
            ShipmentMethod::Courier => "Courier",
            ShipmentMethod::NotSure => "Not sure",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerType {
    Lcl,
    Fcl,
}

/// Incoterm-style answer to "who pays for international shipping".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingPayment {
    SupplierPaysCif,
    CustomerPaysFob,
    CustomerPaysExw,
    NotSure,
}

impl ShippingPayment {
    /// Supplier delivers to the home port; only customs clearance is needed.
    pub const fn is_clearance_only(self) -> bool {
        matches!(self, ShippingPayment::SupplierPaysCif)
    }

    /// The customer arranges some or all of the international freight.
    pub const fn is_freight_forwarding(self) -> bool {
        matches!(
            self,
            ShippingPayment::CustomerPaysFob | ShippingPayment::CustomerPaysExw
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            ShippingPayment::SupplierPaysCif => "Supplier pays shipping (CIF)",
            ShippingPayment::CustomerPaysFob => "Customer pays from origin port (FOB)",
            ShippingPayment::CustomerPaysExw => "Customer arranges door to door (EXW)",
            ShippingPayment::NotSure => "Not sure",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportService {
    FullService,
    DocsOnly,
    NotSure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationCountry {
    Australia,
    Usa,
    Uk,
    Canada,
    Japan,
    China,
    Singapore,
    Germany,
    France,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CargoType {
    GeneralGoods,
    FoodBeverages,
    PersonalEffects,
    VehiclesMachinery,
    ChemicalsDangerous,
    DocumentsSamples,
    FrozenGoods,
    PerishableGoods,
    Other,
}

impl CargoType {
    /// Food clears under biosecurity time pressure; frozen and perishable lines only add
    /// complexity.
    pub const fn raises_urgency(self) -> bool {
        matches!(self, CargoType::FoodBeverages)
    }

    pub const fn is_hazardous(self) -> bool {
        matches!(self, CargoType::ChemicalsDangerous)
    }

    /// Cargo where the customer must say whether items are used or new.
    pub const fn needs_item_condition(self) -> bool {
        matches!(
            self,
            CargoType::PersonalEffects | CargoType::VehiclesMachinery
        )
    }

    /// Cargo where the customer must say whether temperature control is needed.
    pub const fn needs_temperature_answer(self) -> bool {
        matches!(
            self,
            CargoType::FoodBeverages | CargoType::ChemicalsDangerous
        )
    }

    pub const fn label(self) -> &'static str {
        match self {
            CargoType::GeneralGoods => "General goods",
            CargoType::FoodBeverages => "Food & beverages",
            CargoType::PersonalEffects => "Personal effects",
            CargoType::VehiclesMachinery => "Vehicles & machinery",
            CargoType::ChemicalsDangerous => "Chemicals & dangerous goods",
            CargoType::DocumentsSamples => "Documents & samples",
            CargoType::FrozenGoods => "Frozen goods",
            CargoType::PerishableGoods => "Perishable goods",
            CargoType::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCondition {
    Used,
    New,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomsCodeStatus {
    HaveCode,
    NeedHelp,
    ApplyMyself,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentId {
    AirWaybill,
    BillOfLading,
    CourierReceipt,
    CommercialInvoice,
    PackingList,
    ExportDeclaration,
    Msds,
}

impl DocumentId {
    pub const ALL: [DocumentId; 7] = [
        DocumentId::AirWaybill,
        DocumentId::BillOfLading,
        DocumentId::CourierReceipt,
        DocumentId::CommercialInvoice,
        DocumentId::PackingList,
        DocumentId::ExportDeclaration,
        DocumentId::Msds,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            DocumentId::AirWaybill => "air_waybill",
            DocumentId::BillOfLading => "bill_of_lading",
            DocumentId::CourierReceipt => "courier_receipt",
            DocumentId::CommercialInvoice => "commercial_invoice",
            DocumentId::PackingList => "packing_list",
            DocumentId::ExportDeclaration => "export_declaration",
            DocumentId::Msds => "msds",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.key() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Upload,
    DontHave,
    NeedHelp,
}

/// Every answer the wizard collects. Fields are reset, never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Answers {
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
    pub email: String,
    pub phone: String,
    pub consent_checkbox: bool,

    pub direction: Option<Direction>,
    pub customer_type: Option<CustomerType>,

    pub goods_location: Option<GoodsTiming>,
    pub arrival_method: Option<ArrivalMethod>,
    pub arrival_timeline: Option<ArrivalTimeline>,

    pub shipping_payment: Option<ShippingPayment>,
    pub shipment_method: Option<ShipmentMethod>,
    pub container_type: Option<ContainerType>,

    pub export_service_needed: Option<ExportService>,
    pub destination_country: Option<DestinationCountry>,

    pub cargo_type: Option<CargoType>,
    pub cargo_details: String,
    pub personal_item_condition: Option<ItemCondition>,
    pub personal_item_mixed: bool,
    pub other_cargo_description: String,
    pub requires_temperature_control: Option<bool>,
    pub declared_value: Option<Money>,

    pub needs_port_delivery: Option<bool>,
    pub delivery_address: String,
    pub packing_info_combined: String,

    pub customs_code_status: Option<CustomsCodeStatus>,
    pub customs_code_number: String,

    pub document_status: BTreeMap<DocumentId, DocumentStatus>,
}

impl Answers {
    pub fn has_contact_details(&self) -> bool {
        [&self.first_name, &self.last_name, &self.email, &self.phone]
            .iter()
            .all(|value| !value.trim().is_empty())
    }

    pub fn has_classification(&self) -> bool {
        self.direction.is_some() && self.customer_type.is_some() && self.cargo_type.is_some()
    }

    pub fn is_import(&self) -> bool {
        self.direction == Some(Direction::Import)
    }

    pub fn is_export(&self) -> bool {
        self.direction == Some(Direction::Export)
    }

    pub fn wants_port_delivery(&self) -> bool {
        self.needs_port_delivery == Some(true)
    }

    pub fn document_status(&self, document: DocumentId) -> Option<DocumentStatus> {
        self.document_status.get(&document).copied()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

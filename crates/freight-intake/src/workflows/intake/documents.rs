use serde::Serialize;

use super::domain::{Answers, CargoType, Direction, DocumentId, DocumentStatus, GoodsTiming};
use super::domain::ShipmentMethod;

/// One entry on the document-upload checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentRequirement {
    pub id: DocumentId,
    pub title: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub allow_multiple: bool,
    /// The document may be replaced with typed packing information.
    pub allow_skip: bool,
}

impl DocumentRequirement {
    const fn new(id: DocumentId, title: &'static str, description: &'static str) -> Self {
        Self {
            id,
            title,
            description,
            required: true,
            allow_multiple: false,
            allow_skip: false,
        }
    }

    const fn multiple(mut self) -> Self {
        self.allow_multiple = true;
        self
    }

    const fn skippable(mut self) -> Self {
        self.allow_skip = true;
        self
    }

    const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// Aggregate counts consumed by readiness scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentTally {
    pub required: usize,
    pub uploaded: usize,
    /// Whether the customer has recorded any document status yet.
    pub any_recorded: bool,
}

/// Documents the customer is asked for, derived from direction, method, and cargo.
pub fn document_checklist(answers: &Answers) -> Vec<DocumentRequirement> {
    let mut documents = Vec::new();

    match answers.direction {
        Some(Direction::Import) => {
            if answers.goods_location != Some(GoodsTiming::NotShippedYet) {
                match answers.shipment_method {
                    Some(ShipmentMethod::AirFreight) => documents.push(DocumentRequirement::new(
                        DocumentId::AirWaybill,
                        "Air Waybill",
                        "Air transport document with tracking number",
                    )),
                    Some(ShipmentMethod::SeaFreight) => documents.push(DocumentRequirement::new(
                        DocumentId::BillOfLading,
                        "Bill of Lading",
                        "Sea transport document proving ownership",
                    )),
                    Some(ShipmentMethod::Courier) => documents.push(DocumentRequirement::new(
                        DocumentId::CourierReceipt,
                        "Courier Receipt/Tracking",
                        "Courier service tracking document",
                    )),
                    Some(ShipmentMethod::NotSure) | None => {}
                }
            }

            documents.push(
                DocumentRequirement::new(
                    DocumentId::CommercialInvoice,
                    "Commercial Invoice or Draft Invoice",
                    "Invoice with item details and values",
                )
                .multiple(),
            );
            documents.push(
                DocumentRequirement::new(
                    DocumentId::PackingList,
                    "Packing List or Draft packing list",
                    "Detailed packing information",
                )
                .multiple()
                .skippable()
                .required(answers.wants_port_delivery()),
            );
        }
        Some(Direction::Export) => {
            documents.push(
                DocumentRequirement::new(
                    DocumentId::CommercialInvoice,
                    "Commercial Invoice",
                    "Invoice with item details and values",
                )
                .multiple(),
            );
            documents.push(
                DocumentRequirement::new(
                    DocumentId::PackingList,
                    "Packing List",
                    "Detailed packing information",
                )
                .multiple()
                .skippable(),
            );
            documents.push(DocumentRequirement::new(
                DocumentId::ExportDeclaration,
                "Export Declaration",
                "Official export documentation",
            ));
        }
        None => {}
    }

    if answers.cargo_type == Some(CargoType::ChemicalsDangerous) {
        documents.push(
            DocumentRequirement::new(
                DocumentId::Msds,
                "MSDS - Material Safety Data Sheet",
                "Safety data sheet for hazardous materials",
            )
            .multiple(),
        );
    }

    documents
}

pub fn document_tally(answers: &Answers) -> DocumentTally {
    let required: Vec<DocumentId> = document_checklist(answers)
        .into_iter()
        .filter(|document| document.required)
        .map(|document| document.id)
        .collect();

    let uploaded = required
        .iter()
        .filter(|id| answers.document_status(**id) == Some(DocumentStatus::Upload))
        .count();

    DocumentTally {
        required: required.len(),
        uploaded,
        any_recorded: !answers.document_status.is_empty(),
    }
}

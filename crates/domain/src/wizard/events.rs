use chrono::{DateTime, Utc};
use cqrs_es::DomainEvent;
use serde::{Deserialize, Serialize};

use super::{
    aggregate::{MedicationType, Step},
    models::{Address, CardDetails, NonPrescriptionItem, Prescription},
};
use crate::estimates::DeliveryEstimate;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        id: String,
        created_at: DateTime<Utc>,
    },

    MedicationTypeSelected {
        id: String,
        medication_type: MedicationType,
        step: Step,
        updated_at: DateTime<Utc>,
    },

    AddressSubmitted {
        id: String,
        address: Address,
        step: Step,
        updated_at: DateTime<Utc>,
    },

    CardDetailsSubmitted {
        id: String,
        card: CardDetails,
        updated_at: DateTime<Utc>,
    },

    PrescriptionSubmitted {
        id: String,
        prescription: Prescription,
        step: Step,
        updated_at: DateTime<Utc>,
    },

    NonPrescriptionSubmitted {
        id: String,
        items: Vec<NonPrescriptionItem>,
        step: Step,
        updated_at: DateTime<Utc>,
    },

    EstimatesRequested {
        id: String,
        generation: u64,
        item_step: Step,
        updated_at: DateTime<Utc>,
    },

    EstimatesResolved {
        id: String,
        generation: u64,
        estimates: Vec<DeliveryEstimate>,
        updated_at: DateTime<Utc>,
    },

    SteppedBack {
        id: String,
        step: Step,
        updated_at: DateTime<Utc>,
    },

    SessionReset {
        id: String,
        updated_at: DateTime<Utc>,
    },
}

impl DomainEvent for Event {
    fn event_type(&self) -> String {
        match self {
            Event::SessionStarted { .. } => "Wizard:SessionStarted".to_string(),
            Event::MedicationTypeSelected { .. } => "Wizard:MedicationTypeSelected".to_string(),
            Event::AddressSubmitted { .. } => "Wizard:AddressSubmitted".to_string(),
            Event::CardDetailsSubmitted { .. } => "Wizard:CardDetailsSubmitted".to_string(),
            Event::PrescriptionSubmitted { .. } => "Wizard:PrescriptionSubmitted".to_string(),
            Event::NonPrescriptionSubmitted { .. } => {
                "Wizard:NonPrescriptionSubmitted".to_string()
            }
            Event::EstimatesRequested { .. } => "Wizard:EstimatesRequested".to_string(),
            Event::EstimatesResolved { .. } => "Wizard:EstimatesResolved".to_string(),
            Event::SteppedBack { .. } => "Wizard:SteppedBack".to_string(),
            Event::SessionReset { .. } => "Wizard:SessionReset".to_string(),
        }
    }

    fn event_version(&self) -> String {
        "1.0".to_string()
    }
}

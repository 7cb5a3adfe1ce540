use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cqrs_es::Aggregate;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{Error, FieldErrors},
    estimates::{is_complete_set, DeliveryEstimate},
};

use super::{
    models::{Address, CardDetails, NonPrescriptionItem, Prescription},
    validation, Command, Event,
};

/// Wizard screens, serialized as the step number.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(into = "u8", try_from = "u8")]
pub enum Step {
    /// Medication type and address intake
    #[default]
    Welcome,
    Address,
    Prescription,
    NonPrescription,
    /// Delivery comparison
    Delivery,
}

impl Step {
    pub fn number(self) -> u8 {
        match self {
            Step::Welcome => 0,
            Step::Address => 1,
            Step::Prescription => 2,
            Step::NonPrescription => 3,
            Step::Delivery => 4,
        }
    }

    /// First item-entry step of a flow.
    pub fn first_item_step(medication_type: MedicationType) -> Step {
        match medication_type {
            MedicationType::NonPrescription => Step::NonPrescription,
            MedicationType::Prescription | MedicationType::Both => Step::Prescription,
        }
    }
}

impl From<Step> for u8 {
    fn from(step: Step) -> Self {
        step.number()
    }
}

impl TryFrom<u8> for Step {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Step::Welcome),
            1 => Ok(Step::Address),
            2 => Ok(Step::Prescription),
            3 => Ok(Step::NonPrescription),
            4 => Ok(Step::Delivery),
            other => Err(format!("unknown wizard step {other}")),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Welcome => "welcome",
            Step::Address => "address",
            Step::Prescription => "prescription",
            Step::NonPrescription => "non-prescription",
            Step::Delivery => "delivery",
        };
        write!(f, "{} ({})", name, self.number())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum MedicationType {
    Prescription,
    NonPrescription,
    Both,
}

impl MedicationType {
    pub fn includes_prescription(self) -> bool {
        matches!(self, MedicationType::Prescription | MedicationType::Both)
    }

    pub fn includes_non_prescription(self) -> bool {
        matches!(self, MedicationType::NonPrescription | MedicationType::Both)
    }
}

/// The page state of one wizard session.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub current_step: Step,
    pub medication_type: Option<MedicationType>,
    pub address: Option<Address>,
    pub prescription: Option<Prescription>,
    pub non_prescription_items: Option<Vec<NonPrescriptionItem>>,
    pub delivery_estimates: Option<Vec<DeliveryEstimate>>,
}

impl AppState {
    pub fn initial() -> Self {
        Self::default()
    }

    /// Forward step sequence of the current flow, for the step indicator.
    pub fn steps(&self) -> Vec<Step> {
        match self.medication_type {
            None => vec![Step::Welcome],
            Some(MedicationType::Prescription) => vec![
                Step::Welcome,
                Step::Address,
                Step::Prescription,
                Step::Delivery,
            ],
            Some(MedicationType::NonPrescription) => vec![
                Step::Welcome,
                Step::Address,
                Step::NonPrescription,
                Step::Delivery,
            ],
            Some(MedicationType::Both) => vec![
                Step::Welcome,
                Step::Address,
                Step::Prescription,
                Step::NonPrescription,
                Step::Delivery,
            ],
        }
    }
}

/// Wizard session aggregate
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Wizard {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub state: AppState,

    /// Card captured ahead of the prescription screen
    pub card_details: Option<CardDetails>,
    /// Item step whose submission completed the package
    pub last_item_step: Option<Step>,
    /// Generation of the estimate calculation in flight
    pub pending_estimate: Option<u64>,
    /// Last issued estimate generation; survives resets
    pub generation: u64,
}

pub const AGGREGATE_TYPE: &str = "Wizard";

#[derive(Clone, Default)]
pub struct Services {}

#[async_trait]
impl Aggregate for Wizard {
    type Command = Command;
    type Event = Event;
    type Error = Error;
    type Services = Services;

    fn aggregate_type() -> String {
        AGGREGATE_TYPE.to_string()
    }

    async fn handle(
        &self,
        command: Self::Command,
        _services: &Self::Services,
    ) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            Command::StartSession { id } => {
                self.validate_new()?;

                Ok(vec![Event::SessionStarted {
                    id,
                    created_at: Utc::now(),
                }])
            }

            Command::SelectMedicationType { medication_type } => {
                self.validate_idle()?;

                let step = if self.state.address.is_some() {
                    Step::first_item_step(medication_type)
                } else {
                    Step::Address
                };

                Ok(vec![Event::MedicationTypeSelected {
                    id: self.id.clone(),
                    medication_type,
                    step,
                    updated_at: Utc::now(),
                }])
            }

            Command::SubmitAddress { address } => {
                self.validate_idle()?;

                let step = match self.state.medication_type {
                    Some(MedicationType::NonPrescription) => Step::NonPrescription,
                    _ => Step::Prescription,
                };
                self.validate_address_step(step)?;
                validation::address(&address)?;

                Ok(vec![Event::AddressSubmitted {
                    id: self.id.clone(),
                    address,
                    step,
                    updated_at: Utc::now(),
                }])
            }

            Command::SubmitCardDetails { card } => {
                self.validate_idle()?;
                self.validate_flow_includes(Step::Prescription)?;
                validation::card(&card)?;

                Ok(vec![Event::CardDetailsSubmitted {
                    id: self.id.clone(),
                    card,
                    updated_at: Utc::now(),
                }])
            }

            Command::SubmitPrescription { prescription } => {
                self.validate_idle()?;
                self.validate_flow_includes(Step::Prescription)?;
                validation::prescription(&prescription)?;

                let awaiting_items = self.state.medication_type == Some(MedicationType::Both)
                    && self.state.non_prescription_items.is_none();

                if awaiting_items {
                    return Ok(vec![Event::PrescriptionSubmitted {
                        id: self.id.clone(),
                        prescription,
                        step: Step::NonPrescription,
                        updated_at: Utc::now(),
                    }]);
                }

                self.validate_destination()?;
                let now = Utc::now();

                Ok(vec![
                    Event::PrescriptionSubmitted {
                        id: self.id.clone(),
                        prescription,
                        step: Step::Prescription,
                        updated_at: now,
                    },
                    self.request_estimates(Step::Prescription, now),
                ])
            }

            Command::SubmitNonPrescription { items } => {
                self.validate_idle()?;
                self.validate_flow_includes(Step::NonPrescription)?;
                validation::items(&items)?;

                let awaiting_prescription = self.state.medication_type
                    == Some(MedicationType::Both)
                    && self.state.prescription.is_none();

                if awaiting_prescription {
                    return Ok(vec![Event::NonPrescriptionSubmitted {
                        id: self.id.clone(),
                        items,
                        step: Step::Prescription,
                        updated_at: Utc::now(),
                    }]);
                }

                self.validate_destination()?;
                let now = Utc::now();

                Ok(vec![
                    Event::NonPrescriptionSubmitted {
                        id: self.id.clone(),
                        items,
                        step: Step::NonPrescription,
                        updated_at: now,
                    },
                    self.request_estimates(Step::NonPrescription, now),
                ])
            }

            Command::ResolveEstimates {
                generation,
                estimates,
            } => {
                self.validate_existing()?;

                // Late result of a calculation cancelled by Back or Reset.
                if self.pending_estimate != Some(generation) {
                    return Ok(vec![]);
                }

                if !is_complete_set(&estimates) {
                    return Err(FieldErrors::single(
                        "deliveryEstimates",
                        "Expected one drone and one car estimate with a single recommendation",
                    ));
                }

                Ok(vec![Event::EstimatesResolved {
                    id: self.id.clone(),
                    generation,
                    estimates,
                    updated_at: Utc::now(),
                }])
            }

            Command::GoBack => {
                self.validate_existing()?;

                match self.back_target() {
                    Some(step) => Ok(vec![Event::SteppedBack {
                        id: self.id.clone(),
                        step,
                        updated_at: Utc::now(),
                    }]),
                    None => Ok(vec![]),
                }
            }

            Command::Reset => {
                self.validate_existing()?;

                Ok(vec![Event::SessionReset {
                    id: self.id.clone(),
                    updated_at: Utc::now(),
                }])
            }
        }
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            Event::SessionStarted { id, created_at } => {
                self.id = id;
                self.created_at = created_at;
                self.updated_at = created_at;
                self.state = AppState::initial();
            }

            Event::MedicationTypeSelected {
                medication_type,
                step,
                updated_at,
                ..
            } => {
                if !medication_type.includes_prescription() {
                    self.state.prescription = None;
                    self.card_details = None;
                }
                if !medication_type.includes_non_prescription() {
                    self.state.non_prescription_items = None;
                }
                self.state.medication_type = Some(medication_type);
                self.state.delivery_estimates = None;
                self.state.current_step = step;
                self.last_item_step = None;
                self.updated_at = updated_at;
            }

            Event::AddressSubmitted {
                address,
                step,
                updated_at,
                ..
            } => {
                // estimates were computed for the previous destination
                self.state.address = Some(address);
                self.state.delivery_estimates = None;
                self.state.current_step = step;
                self.last_item_step = None;
                self.updated_at = updated_at;
            }

            Event::CardDetailsSubmitted {
                card, updated_at, ..
            } => {
                self.card_details = Some(card);
                self.updated_at = updated_at;
            }

            Event::PrescriptionSubmitted {
                prescription,
                step,
                updated_at,
                ..
            } => {
                self.state.prescription = Some(prescription);
                self.state.current_step = step;
                self.updated_at = updated_at;
            }

            Event::NonPrescriptionSubmitted {
                items,
                step,
                updated_at,
                ..
            } => {
                self.state.non_prescription_items = Some(items);
                self.state.current_step = step;
                self.updated_at = updated_at;
            }

            Event::EstimatesRequested {
                generation,
                item_step,
                updated_at,
                ..
            } => {
                self.generation = generation;
                self.pending_estimate = Some(generation);
                self.last_item_step = Some(item_step);
                self.updated_at = updated_at;
            }

            Event::EstimatesResolved {
                estimates,
                updated_at,
                ..
            } => {
                self.state.delivery_estimates = Some(estimates);
                self.state.current_step = Step::Delivery;
                self.pending_estimate = None;
                self.updated_at = updated_at;
            }

            Event::SteppedBack {
                step, updated_at, ..
            } => {
                self.state.current_step = step;
                self.pending_estimate = None;
                self.updated_at = updated_at;
            }

            Event::SessionReset { updated_at, .. } => {
                self.state = AppState::initial();
                self.card_details = None;
                self.last_item_step = None;
                self.pending_estimate = None;
                self.updated_at = updated_at;
            }
        }
    }
}

impl Wizard {
    pub fn is_calculating(&self) -> bool {
        self.pending_estimate.is_some()
    }

    /// Step "back" leads to from the current one, `None` on the welcome
    /// screen. Item steps always return to where the address was entered so
    /// that the "both" flow never cycles into an item step already completed.
    pub fn back_target(&self) -> Option<Step> {
        match self.state.current_step {
            Step::Welcome => None,
            Step::Address => Some(Step::Welcome),
            Step::Prescription | Step::NonPrescription => match self.state.medication_type {
                None => Some(Step::Welcome),
                Some(_) => Some(Step::Address),
            },
            Step::Delivery => Some(self.last_item_step.unwrap_or(
                match self.state.medication_type {
                    Some(MedicationType::NonPrescription) => Step::NonPrescription,
                    _ => Step::Prescription,
                },
            )),
        }
    }

    fn request_estimates(&self, item_step: Step, now: DateTime<Utc>) -> Event {
        Event::EstimatesRequested {
            id: self.id.clone(),
            generation: self.generation + 1,
            item_step,
            updated_at: now,
        }
    }

    fn validate_new(&self) -> Result<(), Error> {
        if !self.id.is_empty() {
            return Err(Error::Uniqueness {
                field: "id".to_string(),
            });
        }
        Ok(())
    }

    fn validate_existing(&self) -> Result<(), Error> {
        if self.id.is_empty() {
            return Err(Error::NotFound {
                entity: AGGREGATE_TYPE.to_string(),
            });
        }
        Ok(())
    }

    /// Addresses are taken on the address screen, or on the welcome screen
    /// while no medication type is chosen.
    fn validate_address_step(&self, to: Step) -> Result<(), Error> {
        match (self.state.current_step, self.state.medication_type) {
            (Step::Address, _) | (Step::Welcome, None) => Ok(()),
            (from, _) => Err(Error::InvalidStateTransition {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }

    fn validate_idle(&self) -> Result<(), Error> {
        self.validate_existing()?;
        if self.is_calculating() {
            return Err(Error::EstimatePending);
        }
        Ok(())
    }

    fn validate_flow_includes(&self, step: Step) -> Result<(), Error> {
        let included = match (self.state.medication_type, step) {
            (None, _) => true,
            (Some(kind), Step::Prescription) => kind.includes_prescription(),
            (Some(kind), Step::NonPrescription) => kind.includes_non_prescription(),
            _ => true,
        };
        if !included {
            return Err(Error::InvalidStateTransition {
                from: self.state.current_step.to_string(),
                to: step.to_string(),
            });
        }
        Ok(())
    }

    fn validate_destination(&self) -> Result<(), Error> {
        if self.state.address.is_none() {
            return Err(FieldErrors::single(
                "address",
                "A delivery address is required before comparing delivery options",
            ));
        }
        Ok(())
    }
}

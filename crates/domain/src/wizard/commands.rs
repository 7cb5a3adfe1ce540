use serde::{Deserialize, Serialize};

use super::{
    aggregate::MedicationType,
    models::{Address, CardDetails, NonPrescriptionItem, Prescription},
};
use crate::estimates::DeliveryEstimate;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Command {
    /// Open a new wizard session
    StartSession { id: String },

    /// Choose prescription, non-prescription or both
    SelectMedicationType { medication_type: MedicationType },

    /// Delivery address from the address screen
    SubmitAddress { address: Address },

    /// Insurance card from the card scanning screen
    SubmitCardDetails { card: CardDetails },

    /// Confirmed prescription
    SubmitPrescription { prescription: Prescription },

    /// Products picked from the catalog
    SubmitNonPrescription { items: Vec<NonPrescriptionItem> },

    /// Result of the estimate calculation started by the last item step
    ResolveEstimates {
        generation: u64,
        estimates: Vec<DeliveryEstimate>,
    },

    GoBack,

    /// Start over, dropping everything entered so far
    Reset,
}

impl Command {
    /// Item submissions may start a background estimate calculation.
    pub fn may_request_estimates(&self) -> bool {
        matches!(
            self,
            Command::SubmitPrescription { .. } | Command::SubmitNonPrescription { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::StartSession { .. } => "StartSession",
            Command::SelectMedicationType { .. } => "SelectMedicationType",
            Command::SubmitAddress { .. } => "SubmitAddress",
            Command::SubmitCardDetails { .. } => "SubmitCardDetails",
            Command::SubmitPrescription { .. } => "SubmitPrescription",
            Command::SubmitNonPrescription { .. } => "SubmitNonPrescription",
            Command::ResolveEstimates { .. } => "ResolveEstimates",
            Command::GoBack => "GoBack",
            Command::Reset => "Reset",
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::{
    errors::Error,
    estimates::{DeliveryEstimate, DeliveryMethod, Package},
};

use super::{
    aggregate::{AppState, Step},
    models::{Address, NonPrescriptionItem, Prescription},
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MethodTotal {
    pub method: DeliveryMethod,
    pub total: f64,
}

/// Read-only data for the delivery comparison screen.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliverySummary {
    pub address: Address,
    pub formatted_address: String,
    pub prescription: Option<Prescription>,
    pub non_prescription_items: Option<Vec<NonPrescriptionItem>>,
    pub delivery_estimates: Vec<DeliveryEstimate>,
    /// Grams
    pub total_weight: f64,
    pub total_items: usize,
    pub totals: Vec<MethodTotal>,
}

impl DeliverySummary {
    pub fn from_state(state: &AppState) -> Result<Self, Error> {
        let (Step::Delivery, Some(address), Some(estimates)) = (
            state.current_step,
            &state.address,
            &state.delivery_estimates,
        ) else {
            return Err(Error::InvalidStateTransition {
                from: state.current_step.to_string(),
                to: Step::Delivery.to_string(),
            });
        };

        let package = Package::from_state(state);
        let goods = package.goods_total();
        let totals = estimates
            .iter()
            .map(|estimate| MethodTotal {
                method: estimate.method,
                total: estimate.cost + goods,
            })
            .collect();

        Ok(Self {
            address: address.clone(),
            formatted_address: address.formatted(),
            prescription: state.prescription.clone(),
            non_prescription_items: state.non_prescription_items.clone(),
            delivery_estimates: estimates.clone(),
            total_weight: package.total_weight(),
            total_items: package.total_items(),
            totals,
        })
    }

    pub fn estimate(&self, method: DeliveryMethod) -> Option<&DeliveryEstimate> {
        self.delivery_estimates.iter().find(|e| e.method == method)
    }

    /// Delivery cost plus prescription fee plus item prices.
    pub fn total(&self, method: DeliveryMethod) -> Option<f64> {
        self.totals
            .iter()
            .find(|t| t.method == method)
            .map(|t| t.total)
    }

    pub fn recommended(&self) -> Option<&DeliveryEstimate> {
        self.delivery_estimates.iter().find(|e| e.recommended)
    }
}

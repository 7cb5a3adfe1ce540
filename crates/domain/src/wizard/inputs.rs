use serde::{Deserialize, Serialize};

use super::aggregate::MedicationType;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectMedicationTypeInput {
    pub medication_type: MedicationType,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
}

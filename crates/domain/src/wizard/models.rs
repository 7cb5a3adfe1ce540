use derive_new::new;
use serde::{Deserialize, Serialize};

/// Prescription fee charged when the prescription carries none, in euros.
pub const DEFAULT_PRESCRIPTION_FEE: f64 = 7.55;

/// Heaviest prescription package accepted, in grams.
pub const MAX_PRESCRIPTION_WEIGHT: f64 = 5000.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, new)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl Address {
    /// Single-line form shown on the comparison screen.
    pub fn formatted(&self) -> String {
        format!(
            "{}, {}, {}, {}",
            self.street, self.city, self.postal_code, self.country
        )
    }
}

/// Package dimensions in centimetres.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, new)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Grams
    pub weight: f64,
    pub dimensions: Dimensions,
    pub urgent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescription_fee: Option<f64>,
}

impl Prescription {
    pub fn fee(&self) -> f64 {
        self.prescription_fee.unwrap_or(0.0)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NonPrescriptionItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: f64,
    /// Grams
    pub weight: f64,
    pub dimensions: Dimensions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Insurance card details, either scanned or typed in by hand.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub card_number: String,
    pub card_holder: String,
    pub insurance_id: String,
    #[serde(default)]
    pub scanned: bool,
}

impl CardDetails {
    /// Initial prescription data offered by the prescription screen once a
    /// card is known.
    pub fn draft_prescription(&self) -> Prescription {
        let mut draft = Prescription::draft();
        if !self.card_holder.trim().is_empty() {
            draft.title = format!("Medication for {}", self.card_holder);
            draft.patient_name = Some(self.card_holder.clone());
        }
        draft.insurance_company = Some("Auto-detected from card".to_string());
        draft
    }
}

impl Prescription {
    /// Prescription defaults used when no card has been captured.
    pub fn draft() -> Self {
        use rand::Rng;

        Self {
            id: format!("PRX-{}", rand::thread_rng().gen_range(0..10_000)),
            title: "Medication for Patient".to_string(),
            description: "Prescription medication associated with insurance card".to_string(),
            weight: 100.0,
            dimensions: Dimensions::new(10.0, 5.0, 3.0),
            urgent: false,
            patient_name: None,
            insurance_company: None,
            birth_date: None,
            prescription_fee: Some(DEFAULT_PRESCRIPTION_FEE),
        }
    }
}

//! Delivery estimates: the mock calculator and the remote provider that
//! falls back to it.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::{
    config::Settings,
    errors::Error,
    wizard::{Address, AppState, NonPrescriptionItem, Prescription},
};

/// Mock calculator and its provider
pub mod calculator;

/// Random sources for the calculator
pub mod random;

/// HTTP estimates provider
pub mod remote;

pub use calculator::{calculate, MockEstimator};
pub use random::{FixedSequence, RandomSource, SystemRandom};
pub use remote::RemoteEstimator;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Drone,
    Car,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherCondition {
    /// Degrees Celsius
    pub temperature: f64,
    /// km/h
    pub wind_speed: f64,
    /// Percent
    pub precipitation: f64,
    /// Percent
    pub visibility: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryEstimate {
    pub method: DeliveryMethod,
    /// Minutes
    pub time: u32,
    /// Euros
    pub cost: f64,
    pub weather_suitable: bool,
    pub recommended: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_condition: Option<WeatherCondition>,
    /// Kilometres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

/// Everything that goes into the delivery box.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, new)]
pub struct Package {
    pub prescription: Option<Prescription>,
    pub items: Vec<NonPrescriptionItem>,
}

impl Package {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            prescription: state.prescription.clone(),
            items: state.non_prescription_items.clone().unwrap_or_default(),
        }
    }

    /// Grams
    pub fn total_weight(&self) -> f64 {
        let prescription = self.prescription.as_ref().map_or(0.0, |p| p.weight);
        prescription + self.items.iter().map(|item| item.weight).sum::<f64>()
    }

    pub fn total_items(&self) -> usize {
        usize::from(self.prescription.is_some()) + self.items.len()
    }

    pub fn urgent(&self) -> bool {
        self.prescription.as_ref().is_some_and(|p| p.urgent)
    }

    /// Prescription fee plus item prices, before delivery.
    pub fn goods_total(&self) -> f64 {
        let fee = self.prescription.as_ref().map_or(0.0, Prescription::fee);
        fee + self.items.iter().map(|item| item.price).sum::<f64>()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, new)]
pub struct EstimateRequest {
    pub package: Package,
    pub destination: Address,
}

/// Source of delivery estimates. Implementations never fail: whatever goes
/// wrong is absorbed by falling back to mock data.
#[async_trait]
pub trait EstimateProvider: Send + Sync {
    async fn estimate(&self, request: &EstimateRequest) -> Vec<DeliveryEstimate>;
}

/// True when `estimates` holds exactly one drone and one car estimate with
/// exactly one of them recommended.
pub fn is_complete_set(estimates: &[DeliveryEstimate]) -> bool {
    let count = |method| estimates.iter().filter(|e| e.method == method).count();
    estimates.len() == 2
        && count(DeliveryMethod::Drone) == 1
        && count(DeliveryMethod::Car) == 1
        && estimates.iter().filter(|e| e.recommended).count() == 1
}

/// Builds the provider selected by `settings`: remote with mock fallback
/// when an estimates URL is configured, mock only otherwise.
pub fn provider(settings: &Settings) -> Result<Arc<dyn EstimateProvider>, Error> {
    let mock = MockEstimator::new(Box::new(SystemRandom::new()), settings.estimate_delay);

    match &settings.estimates_url {
        Some(url) => {
            tracing::info!("Using remote delivery estimates at {}", url);
            let remote = RemoteEstimator::new(url.clone(), settings.estimates_timeout, mock)?;
            Ok(Arc::new(remote))
        }
        None => Ok(Arc::new(mock)),
    }
}

/// Mock provider without the simulated delay, mostly for tests.
pub fn instant(random: Box<dyn RandomSource>) -> Arc<dyn EstimateProvider> {
    Arc::new(MockEstimator::new(random, Duration::ZERO))
}

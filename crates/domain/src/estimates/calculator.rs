use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;

use super::{
    DeliveryEstimate, DeliveryMethod, EstimateProvider, EstimateRequest, Package, RandomSource,
    WeatherCondition,
};

/// Drone cost per gram, in euros.
const DRONE_COST_PER_GRAM: f64 = 0.02;
const URGENT_DRONE_SURCHARGE: f64 = 5.0;
const URGENT_DRONE_SPEEDUP: u32 = 5;
const MIN_DRONE_TIME: u32 = 1;
/// Drones stay grounded at this wind speed (km/h) and above.
const DRONE_WIND_LIMIT: f64 = 20.0;
/// Grams; drones are never recommended for packages this heavy.
const DRONE_WEIGHT_LIMIT: f64 = 2000.0;
/// Grams; lighter car deliveries get a euro off.
const CAR_DISCOUNT_WEIGHT: f64 = 1000.0;

fn whole(random: &mut dyn RandomSource, low: u32, span: u32) -> u32 {
    low + (random.next_unit() * f64::from(span)).floor() as u32
}

fn between(random: &mut dyn RandomSource, low: f64, high: f64) -> f64 {
    low + random.next_unit() * (high - low)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn weather(random: &mut dyn RandomSource, wind_speed: f64) -> WeatherCondition {
    WeatherCondition {
        temperature: f64::from(whole(random, 18, 8)),
        wind_speed,
        precipitation: between(random, 0.0, 30.0),
        visibility: between(random, 80.0, 100.0),
    }
}

/// Mock drone and car estimates for `package`, drone first.
pub fn calculate(package: &Package, random: &mut dyn RandomSource) -> Vec<DeliveryEstimate> {
    let total_weight = package.total_weight();
    let urgent = package.urgent();

    let wind_speed = f64::from(whole(random, 0, 30));
    let drone_weather_suitable = wind_speed < DRONE_WIND_LIMIT;

    let drone_cost =
        total_weight * DRONE_COST_PER_GRAM + if urgent { URGENT_DRONE_SURCHARGE } else { 0.0 };
    let drone_time = whole(random, 10, 15)
        .saturating_sub(if urgent { URGENT_DRONE_SPEEDUP } else { 0 })
        .max(MIN_DRONE_TIME);

    let car_discount = if total_weight > CAR_DISCOUNT_WEIGHT { 0.0 } else { 1.0 };
    let car_cost = between(random, 5.0, 8.0) - car_discount;
    let car_time = whole(random, 30, 45);

    let drone_distance = round2(between(random, 2.5, 4.0));
    let car_distance = round2(between(random, 5.0, 8.0));

    let drone_recommended =
        drone_weather_suitable && drone_time < car_time && total_weight < DRONE_WEIGHT_LIMIT;

    let drone = DeliveryEstimate {
        method: DeliveryMethod::Drone,
        time: drone_time,
        cost: drone_cost,
        weather_suitable: drone_weather_suitable,
        recommended: drone_recommended,
        weather_condition: Some(weather(random, wind_speed)),
        distance: Some(drone_distance),
    };

    let car = DeliveryEstimate {
        method: DeliveryMethod::Car,
        time: car_time,
        cost: car_cost,
        weather_suitable: true,
        recommended: !drone_recommended,
        weather_condition: Some(weather(random, wind_speed)),
        distance: Some(car_distance),
    };

    vec![drone, car]
}

/// Provider that simulates a slow backend before handing out mock data.
pub struct MockEstimator {
    random: Mutex<Box<dyn RandomSource>>,
    delay: Duration,
}

impl MockEstimator {
    pub fn new(random: Box<dyn RandomSource>, delay: Duration) -> Self {
        Self {
            random: Mutex::new(random),
            delay,
        }
    }

    pub fn calculate(&self, package: &Package) -> Vec<DeliveryEstimate> {
        let mut random = self.random.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        calculate(package, random.as_mut())
    }
}

#[async_trait]
impl EstimateProvider for MockEstimator {
    async fn estimate(&self, request: &EstimateRequest) -> Vec<DeliveryEstimate> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.calculate(&request.package)
    }
}

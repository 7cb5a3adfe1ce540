use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::errors::Error;

use super::{is_complete_set, DeliveryEstimate, EstimateProvider, EstimateRequest, MockEstimator};

#[derive(Error, Debug)]
enum RemoteError {
    #[error("destination has no coordinates")]
    MissingCoordinates,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("expected one drone and one car estimate, got {0}")]
    Malformed(usize),
}

/// Fetches estimates from `GET <url>?lat=..&lon=..`, answering with mock
/// data whenever the endpoint cannot deliver a usable set.
pub struct RemoteEstimator {
    client: reqwest::Client,
    url: String,
    fallback: MockEstimator,
}

impl RemoteEstimator {
    pub fn new(url: String, timeout: Duration, fallback: MockEstimator) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Configuration {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            url,
            fallback,
        })
    }

    async fn fetch(&self, request: &EstimateRequest) -> Result<Vec<DeliveryEstimate>, RemoteError> {
        let coordinates = request
            .destination
            .coordinates
            .ok_or(RemoteError::MissingCoordinates)?;

        let estimates: Vec<DeliveryEstimate> = self
            .client
            .get(&self.url)
            .query(&[("lat", coordinates.lat), ("lon", coordinates.lng)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !is_complete_set(&estimates) {
            return Err(RemoteError::Malformed(estimates.len()));
        }
        Ok(estimates)
    }
}

#[async_trait]
impl EstimateProvider for RemoteEstimator {
    async fn estimate(&self, request: &EstimateRequest) -> Vec<DeliveryEstimate> {
        match self.fetch(request).await {
            Ok(estimates) => {
                tracing::debug!("Received {} remote estimates", estimates.len());
                estimates
            }
            Err(e) => {
                tracing::warn!("Remote estimates unavailable, using mock data: {}", e);
                self.fallback.estimate(request).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use serde_json::{json, Value};

    use super::*;
    use crate::{
        estimates::{DeliveryMethod, FixedSequence, Package},
        wizard::{Address, Coordinates, Prescription},
    };

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/estimates")
    }

    fn estimator(url: String) -> RemoteEstimator {
        let fallback = MockEstimator::new(Box::new(FixedSequence::constant(0.0)), Duration::ZERO);
        RemoteEstimator::new(url, Duration::from_secs(2), fallback).unwrap()
    }

    fn request(coordinates: Option<Coordinates>) -> EstimateRequest {
        let package = Package::new(
            Some(Prescription {
                weight: 500.0,
                ..Prescription::draft()
            }),
            Vec::new(),
        );
        let destination = Address {
            street: "Main St 1".to_string(),
            city: "Berlin".to_string(),
            postal_code: "10115".to_string(),
            country: "Germany".to_string(),
            coordinates,
        };
        EstimateRequest::new(package, destination)
    }

    fn remote_set() -> Value {
        json!([
            { "method": "drone", "time": 14, "cost": 3.0, "weatherSuitable": false, "recommended": false },
            { "method": "car", "time": 33, "cost": 9.5, "weatherSuitable": true, "recommended": true }
        ])
    }

    #[tokio::test]
    async fn uses_remote_estimates_and_passes_coordinates() {
        let app = Router::new().route(
            "/estimates",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("lat").map(String::as_str), Some("52.5"));
                assert_eq!(params.get("lon").map(String::as_str), Some("13.4"));
                Json(remote_set())
            }),
        );
        let url = serve(app).await;

        let estimates = estimator(url)
            .estimate(&request(Some(Coordinates::new(52.5, 13.4))))
            .await;

        assert_eq!(estimates.len(), 2);
        assert_eq!(estimates[1].method, DeliveryMethod::Car);
        assert_eq!(estimates[1].cost, 9.5);
        assert!(estimates[1].recommended);
    }

    #[tokio::test]
    async fn falls_back_on_server_error() {
        let app = Router::new().route(
            "/estimates",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let url = serve(app).await;

        let estimates = estimator(url)
            .estimate(&request(Some(Coordinates::new(52.5, 13.4))))
            .await;

        // mock data: 500 g at 0.02 per gram
        assert_eq!(estimates[0].cost, 10.0);
        assert!(estimates[0].recommended);
    }

    #[tokio::test]
    async fn falls_back_on_malformed_body() {
        let app = Router::new()
            .route("/estimates", get(|| async { Json(json!({ "estimates": [] })) }));
        let url = serve(app).await;

        let estimates = estimator(url)
            .estimate(&request(Some(Coordinates::new(52.5, 13.4))))
            .await;
        assert_eq!(estimates[0].cost, 10.0);
    }

    #[tokio::test]
    async fn falls_back_on_incomplete_set() {
        let app = Router::new().route(
            "/estimates",
            get(|| async {
                Json(json!([
                    { "method": "car", "time": 33, "cost": 9.5, "weatherSuitable": true, "recommended": true }
                ]))
            }),
        );
        let url = serve(app).await;

        let estimates = estimator(url)
            .estimate(&request(Some(Coordinates::new(52.5, 13.4))))
            .await;
        assert_eq!(estimates.len(), 2);
        assert_eq!(estimates[0].cost, 10.0);
    }

    #[tokio::test]
    async fn falls_back_without_coordinates_or_server() {
        let estimates = estimator("http://127.0.0.1:9/estimates".to_string())
            .estimate(&request(None))
            .await;
        assert_eq!(estimates[0].cost, 10.0);

        let estimates = estimator("http://127.0.0.1:9/estimates".to_string())
            .estimate(&request(Some(Coordinates::new(52.5, 13.4))))
            .await;
        assert_eq!(estimates[0].cost, 10.0);
    }
}

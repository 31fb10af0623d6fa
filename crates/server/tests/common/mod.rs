//! Shared fixtures for the HTTP tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use dataset::{class_labels, FEATURE_COUNT, FEATURE_NAMES};
use http_body_util::BodyExt;
use model::{
    FitReport, LogisticModel, LogisticRegressionConfig, ModelArtifact, StandardScaler,
    TrainingSummary,
};
use serde_json::Value;
use server::{build_router, ServerConfig, ServerState};
use tower::ServiceExt;

/// First row of the UCI file, a malignant sample.
pub const MALIGNANT_SAMPLE: [f64; FEATURE_COUNT] = [
    17.99, 10.38, 122.8, 1001.0, 0.1184, 0.2776, 0.3001, 0.1471, 0.2419, 0.07871, 1.095, 0.9053,
    8.589, 153.4, 0.006399, 0.04904, 0.05373, 0.01587, 0.03003, 0.006193, 25.38, 17.33, 184.6,
    2019.0, 0.1622, 0.6656, 0.7119, 0.2654, 0.4601, 0.1189,
];

/// Same sample with a smaller radius, which the fixture model calls benign.
pub fn benign_sample() -> Vec<f64> {
    let mut row = MALIGNANT_SAMPLE.to_vec();
    row[0] = 14.2;
    row
}

/// Hand-built model whose score is `15 - mean radius`.
///
/// Identity scaling keeps the decision easy to reason about: radius above 15
/// is malignant, below is benign.
pub fn fixture_artifact() -> ModelArtifact {
    let mut coefficients = vec![0.0; FEATURE_COUNT];
    coefficients[0] = -1.0;
    let model = LogisticModel {
        feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        classes: class_labels(),
        scaler: StandardScaler {
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![1.0; FEATURE_COUNT],
        },
        coefficients,
        intercept: 15.0,
    };
    ModelArtifact::new(
        model,
        TrainingSummary {
            train_samples: 455,
            test_samples: 114,
            test_fraction: 0.2,
            seed: 42,
            solver: LogisticRegressionConfig::default(),
            fit: FitReport {
                iterations: 7,
                converged: true,
                final_loss: 0.08,
            },
        },
        None,
    )
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        metrics_enabled: false,
        ..ServerConfig::default()
    }
}

pub fn app_with(config: ServerConfig) -> Router {
    build_router(Arc::new(ServerState::from_artifact(config, fixture_artifact())))
}

pub fn app_with_artifact(config: ServerConfig, artifact: ModelArtifact) -> Router {
    build_router(Arc::new(ServerState::from_artifact(config, artifact)))
}

/// Fixture whose tiny scales and alternating weights overflow on huge inputs.
pub fn overflow_prone_artifact() -> ModelArtifact {
    let mut artifact = fixture_artifact();
    artifact.model.scaler.scale = vec![0.003; FEATURE_COUNT];
    artifact.model.coefficients = (0..FEATURE_COUNT)
        .map(|j| if j % 2 == 0 { 0.5 } else { -0.5 })
        .collect();
    artifact
}

pub fn app() -> Router {
    app_with(test_config())
}

pub fn post_json(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .expect("request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

/// Send one request through a fresh clone of the router.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

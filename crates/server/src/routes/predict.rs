use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;

/// Key that selects the positional input format.
const FEATURES_KEY: &str = "features";

/// Successful classification
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    /// Class label, e.g. `malignant` or `benign`
    pub prediction: String,
    /// Class index the label belongs to
    pub class: usize,
    /// Model probability of the predicted class, in [0.5, 1.0]
    pub probability: f64,
}

/// Classify one tumour sample.
///
/// Two body shapes are accepted:
///
/// ```json
/// { "features": [17.99, 10.38, 122.8, ...] }
/// ```
///
/// with exactly one value per model feature in training order, or an object
/// keyed by feature name (`mean_radius`, `mean radius` and `Mean-Radius` are
/// the same name):
///
/// ```json
/// { "mean_radius": 17.99, "mean_texture": 10.38, ... }
/// ```
///
/// Malformed bodies, wrong counts, non-numeric values and unknown names are
/// rejected with 400; the handler never panics on client input.
pub async fn predict(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ServerResult<impl IntoResponse> {
    let started = Instant::now();
    let result = classify(&state, payload);

    match &result {
        Ok(response) => {
            metrics::counter!("bcw_predictions_total", "label" => response.prediction.clone())
                .increment(1);
            metrics::histogram!("bcw_prediction_duration_seconds")
                .record(started.elapsed().as_secs_f64());
            tracing::info!(
                prediction = %response.prediction,
                class = response.class,
                probability = %format!("{:.4}", response.probability),
                "Prediction served"
            );
        }
        Err(err) => {
            metrics::counter!("bcw_prediction_errors_total", "code" => err.error_code())
                .increment(1);
        }
    }

    result.map(Json)
}

fn classify(
    state: &ServerState,
    payload: Result<Json<Value>, JsonRejection>,
) -> ServerResult<PredictResponse> {
    let Json(body) = payload.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(state.config.max_body_size_kb)
        } else {
            rejection.into()
        }
    })?;

    let features = extract_features(state, body)?;
    let prediction = state.model.predict(&features)?;

    Ok(PredictResponse {
        prediction: prediction.label,
        class: prediction.class_index,
        probability: prediction.probability,
    })
}

/// Turn a request body into a feature vector in model order.
pub fn extract_features(state: &ServerState, body: Value) -> ServerResult<Vec<f64>> {
    let expected = state.model.n_features();
    let mut object = match body {
        Value::Object(map) if !map.is_empty() => map,
        Value::Object(_) | Value::Null => {
            return Err(ServerError::BadRequest(
                "Expected a JSON object with data".to_string(),
            ))
        }
        other => {
            return Err(ServerError::BadRequest(format!(
                "Expected a JSON object, got {}",
                json_type(&other)
            )))
        }
    };

    match object.remove(FEATURES_KEY) {
        Some(list) => positional_features(list, expected),
        None => named_features(state, object, expected),
    }
}

fn positional_features(list: Value, expected: usize) -> ServerResult<Vec<f64>> {
    let items = match list {
        Value::Array(items) => items,
        other => {
            return Err(ServerError::BadRequest(format!(
                "Invalid format: 'features' must be a list of {expected} numbers, got {}",
                json_type(&other)
            )))
        }
    };
    if items.len() != expected {
        return Err(ServerError::BadRequest(format!(
            "Invalid format: {expected} features required in the 'features' list, got {}",
            items.len()
        )));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, v)| {
            number(v).ok_or_else(|| {
                ServerError::BadRequest(format!(
                    "Feature at position {i} is not a number: {v}"
                ))
            })
        })
        .collect()
}

fn named_features(
    state: &ServerState,
    object: Map<String, Value>,
    expected: usize,
) -> ServerResult<Vec<f64>> {
    if object.len() != expected {
        return Err(ServerError::BadRequest(format!(
            "Invalid format: {expected} named features required, got {}",
            object.len()
        )));
    }

    let mut slots: Vec<Option<f64>> = vec![None; expected];
    for (name, value) in &object {
        let position = state
            .feature_position(name)
            .ok_or_else(|| ServerError::BadRequest(format!("Unknown feature '{name}'")))?;
        if slots[position].is_some() {
            return Err(ServerError::BadRequest(format!(
                "Feature '{name}' given more than once"
            )));
        }
        let value = number(value).ok_or_else(|| {
            ServerError::BadRequest(format!("Feature '{name}' is not a number: {value}"))
        })?;
        slots[position] = Some(value);
    }

    // With the count matched and no duplicates every slot is filled.
    slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| {
            slot.ok_or_else(|| {
                ServerError::BadRequest(format!(
                    "Missing feature '{}'",
                    state.model.feature_names[i]
                ))
            })
        })
        .collect()
}

fn number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

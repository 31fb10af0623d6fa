//! API route handlers
//!
//! - `health`: liveness, readiness, metrics, and model metadata
//! - `predict`: classification of posted feature vectors

pub mod health;
pub mod predict;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Root liveness banner (GET /)
///
/// # Response
///
/// ```json
/// {
///   "status": "OK",
///   "message": "API online and waiting",
///   "service": "bcw-server",
///   "version": "0.1.0",
///   "endpoints": ["..."]
/// }
/// ```
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    tracing::info!("Health check requested on root endpoint");
    Ok(Json(json!({
        "status": "OK",
        "message": "API online and waiting",
        "service": "bcw-server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/predict",
            "/model",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}

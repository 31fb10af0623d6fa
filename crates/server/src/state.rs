use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dataset::normalize_feature_name;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use model::{EvaluationMetrics, LogisticModel, ModelArtifact, TrainingSummary};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared application state
///
/// Built once at start-up. The model is read-only from then on; only the rate
/// limiter table changes per request.
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Classifier shared by every request
    pub model: Arc<LogisticModel>,

    /// Provenance of the loaded artifact
    pub model_info: Arc<ModelInfo>,

    /// Normalized feature name -> input position
    feature_index: Arc<HashMap<String, usize>>,

    /// Rate limit tracking: API key -> (count, window_start)
    pub rate_limiter: Arc<DashMap<String, (u32, std::time::Instant)>>,

    /// Prometheus render handle, when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

/// Artifact metadata exposed by `GET /model`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub algorithm: String,
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    pub feature_names: Vec<String>,
    pub classes: Vec<String>,
    pub training: TrainingSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationMetrics>,
}

impl ServerState {
    /// Load the artifact named in `config` and build the state.
    ///
    /// Any failure here is fatal: the server must not start without a model.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let artifact =
            ModelArtifact::load(&config.model_path).map_err(|source| ServerError::ModelLoad {
                path: config.model_path.clone(),
                source,
            })?;
        tracing::info!(
            path = %config.model_path.display(),
            features = artifact.model.n_features(),
            trained_at = %artifact.trained_at,
            "Model loaded"
        );
        Ok(Self::from_artifact(config, artifact))
    }

    /// Build the state around an already validated artifact.
    pub fn from_artifact(config: ServerConfig, artifact: ModelArtifact) -> Self {
        let feature_index: HashMap<String, usize> = artifact
            .model
            .feature_names
            .iter()
            .enumerate()
            .map(|(i, name)| (normalize_feature_name(name), i))
            .collect();

        let metrics = if config.metrics_enabled {
            prometheus_handle()
        } else {
            None
        };

        let model_info = ModelInfo {
            algorithm: artifact.algorithm,
            format_version: artifact.format_version,
            trained_at: artifact.trained_at,
            feature_names: artifact.model.feature_names.clone(),
            classes: artifact.model.classes.clone(),
            training: artifact.training,
            evaluation: artifact.evaluation,
        };

        Self {
            config: Arc::new(config),
            model: Arc::new(artifact.model),
            model_info: Arc::new(model_info),
            feature_index: Arc::new(feature_index),
            rate_limiter: Arc::new(DashMap::new()),
            metrics,
        }
    }

    /// Input position of a feature, matched on its normalized name
    pub fn feature_position(&self, name: &str) -> Option<usize> {
        self.feature_index
            .get(&normalize_feature_name(name))
            .copied()
    }

    /// Whether `/predict` requires an API key
    pub fn auth_enabled(&self) -> bool {
        !self.config.api_keys.is_empty()
    }

    /// Check if API key is valid
    pub fn is_valid_api_key(&self, key: &str) -> bool {
        self.config.api_keys.contains(key)
    }

    /// Check rate limit for API key
    pub fn check_rate_limit(&self, key: &str) -> bool {
        let now = std::time::Instant::now();
        let window = std::time::Duration::from_secs(60);
        let limit = self.config.rate_limit_per_minute;

        let mut entry = self.rate_limiter.entry(key.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        // Reset if window has passed
        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        if *count >= limit {
            return false;
        }

        *count += 1;
        true
    }
}

/// Process-wide Prometheus recorder; installed on first use.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static HANDLE: OnceCell<Option<PrometheusHandle>> = OnceCell::new();
    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::warn!(error = %err, "Prometheus recorder unavailable, metrics disabled");
                None
            }
        })
        .clone()
}


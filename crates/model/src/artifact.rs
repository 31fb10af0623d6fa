//! On-disk model format.
//!
//! An artifact is a single pretty-printed JSON document holding the fitted
//! [`LogisticModel`] plus how it was trained and how it scored on held-out
//! data. It is written once by the trainer and only ever read by the server.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::LogisticRegressionConfig;
use crate::error::ModelError;
use crate::logistic::{FitReport, LogisticModel};
use crate::metrics::EvaluationMetrics;

/// Current artifact format revision.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;
pub const ALGORITHM: &str = "logistic_regression";

/// Provenance recorded alongside the parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub train_samples: usize,
    pub test_samples: usize,
    pub test_fraction: f64,
    pub seed: u64,
    pub solver: LogisticRegressionConfig,
    pub fit: FitReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub algorithm: String,
    pub trained_at: DateTime<Utc>,
    pub model: LogisticModel,
    pub training: TrainingSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationMetrics>,
}

impl ModelArtifact {
    pub fn new(
        model: LogisticModel,
        training: TrainingSummary,
        evaluation: Option<EvaluationMetrics>,
    ) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            algorithm: ALGORITHM.to_string(),
            trained_at: Utc::now(),
            model,
            training,
            evaluation,
        }
    }

    /// Write the artifact, replacing any existing file atomically.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');

        let tmp = temp_path(path);
        fs::write(&tmp, &bytes)?;
        if let Err(err) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        tracing::info!(path = %path.display(), bytes = bytes.len(), "model artifact written");
        Ok(())
    }

    /// Read and validate an artifact.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let bytes = fs::read(path.as_ref())?;
        Self::from_slice(&bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let artifact: ModelArtifact = serde_json::from_slice(bytes)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelError::UnsupportedVersion(self.format_version));
        }
        if self.algorithm != ALGORITHM {
            return Err(ModelError::CorruptArtifact(format!(
                "unknown algorithm {:?}",
                self.algorithm
            )));
        }
        self.model.validate()
    }

    pub fn into_model(self) -> LogisticModel {
        self.model
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaler::StandardScaler;

    fn sample() -> ModelArtifact {
        let model = LogisticModel {
            feature_names: vec!["mean radius".into(), "mean texture".into()],
            classes: vec!["malignant".into(), "benign".into()],
            scaler: StandardScaler {
                mean: vec![14.1, 19.3],
                scale: vec![3.5, 4.3],
            },
            coefficients: vec![-1.2, -0.4],
            intercept: 0.6,
        };
        let training = TrainingSummary {
            train_samples: 455,
            test_samples: 114,
            test_fraction: 0.2,
            seed: 42,
            solver: LogisticRegressionConfig::default(),
            fit: FitReport {
                iterations: 8,
                converged: true,
                final_loss: 41.5,
            },
        };
        ModelArtifact::new(model, training, None)
    }

    #[test]
    fn save_then_load_preserves_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model.json");
        let artifact = sample();
        artifact.save(&path).unwrap();

        let loaded = ModelArtifact::load(&path).unwrap();
        assert_eq!(loaded, artifact);
        assert!(!dir.path().join("nested").join("model.json.tmp").exists());
    }

    #[test]
    fn rejects_future_format_version() {
        let mut artifact = sample();
        artifact.format_version = 2;
        let bytes = serde_json::to_vec(&artifact).unwrap();
        assert!(matches!(
            ModelArtifact::from_slice(&bytes),
            Err(ModelError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn rejects_inconsistent_parameters() {
        let mut artifact = sample();
        artifact.model.coefficients.push(1.0);
        let bytes = serde_json::to_vec(&artifact).unwrap();
        assert!(matches!(
            ModelArtifact::from_slice(&bytes),
            Err(ModelError::CorruptArtifact(_))
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            ModelArtifact::from_slice(b"not json"),
            Err(ModelError::Serialization(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            ModelArtifact::load("/no/such/model.json"),
            Err(ModelError::Io(_))
        ));
    }
}

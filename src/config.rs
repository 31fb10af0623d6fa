//! YAML configuration for the BCW training pipeline.
//!
//! All stage settings live in one file, loaded at start-up by `bcw-train`.
//! Every field has a default, so an empty document (or no file at all) trains
//! on `wdbc.data` in the working directory.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "wdbc-logreg"
//!
//! dataset:
//!   path: "data/wdbc.data"
//!   test_fraction: 0.2
//!   seed: 42
//!
//! model:
//!   c: 1.0
//!   max_iter: 100
//!   tol: 0.0001
//!
//! output:
//!   artifact_path: "model.json"
//!   log_file: "training.log"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use model::LogisticRegressionConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level training configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TrainingConfig {
    /// Configuration format version
    #[serde(default = "default_config_version")]
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub dataset: DatasetYamlConfig,

    /// Solver settings
    #[serde(default)]
    pub model: LogisticRegressionConfig,

    #[serde(default)]
    pub output: OutputYamlConfig,
}

impl TrainingConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: TrainingConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.dataset.validate()?;
        self.model
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("model: {e}")))?;
        self.output.validate()?;
        Ok(())
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            version: default_config_version(),
            name: None,
            dataset: DatasetYamlConfig::default(),
            model: LogisticRegressionConfig::default(),
            output: OutputYamlConfig::default(),
        }
    }
}

/// Where the samples come from and how they are held out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetYamlConfig {
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,

    /// Share of samples held out for evaluation.
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,

    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl DatasetYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigLoadError::Validation(
                "dataset.path must not be empty".to_string(),
            ));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ConfigLoadError::Validation(format!(
                "dataset.test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }
}

impl Default for DatasetYamlConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            test_fraction: default_test_fraction(),
            seed: default_seed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputYamlConfig {
    #[serde(default = "default_artifact_path")]
    pub artifact_path: PathBuf,

    /// Mirror training logs to this file in addition to stdout.
    #[serde(default = "default_log_file")]
    pub log_file: Option<PathBuf>,
}

impl OutputYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.artifact_path.as_os_str().is_empty() {
            return Err(ConfigLoadError::Validation(
                "output.artifact_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for OutputYamlConfig {
    fn default() -> Self {
        Self {
            artifact_path: default_artifact_path(),
            log_file: default_log_file(),
        }
    }
}

fn default_config_version() -> String {
    "1.0".to_string()
}
fn default_dataset_path() -> PathBuf {
    PathBuf::from("wdbc.data")
}
fn default_test_fraction() -> f64 {
    0.2
}
fn default_seed() -> u64 {
    42
}
fn default_artifact_path() -> PathBuf {
    PathBuf::from("model.json")
}
fn default_log_file() -> Option<PathBuf> {
    Some(PathBuf::from("training.log"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "wdbc"
dataset:
  path: "data/wdbc.data"
  seed: 7
model:
  max_iter: 5000
"#;

        let config = TrainingConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.name, Some("wdbc".to_string()));
        assert_eq!(config.dataset.path, PathBuf::from("data/wdbc.data"));
        assert_eq!(config.dataset.seed, 7);
        assert_eq!(config.dataset.test_fraction, 0.2);
        assert_eq!(config.model.max_iter, 5000);
        assert_eq!(config.model.c, 1.0);
        assert_eq!(config.output.artifact_path, PathBuf::from("model.json"));
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
version: "1"
output:
  artifact_path: "out/model.json"
  log_file: null
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = TrainingConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output.artifact_path, PathBuf::from("out/model.json"));
        assert!(config.output.log_file.is_none());
    }

    #[test]
    fn test_default_config() {
        let config = TrainingConfig::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.dataset.seed, 42);
        assert_eq!(
            config.output.log_file,
            Some(PathBuf::from("training.log"))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = TrainingConfig::from_yaml("{}").unwrap();
        assert_eq!(config, TrainingConfig::default());
    }

    #[test]
    fn test_unsupported_version() {
        let result = TrainingConfig::from_yaml("version: \"2.0\"\n");
        assert!(matches!(result, Err(ConfigLoadError::UnsupportedVersion(_))));
    }

    #[test]
    fn test_test_fraction_validation() {
        let yaml = r#"
dataset:
  test_fraction: 1.5
"#;

        let result = TrainingConfig::from_yaml(yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("test_fraction"));
    }

    #[test]
    fn test_model_validation() {
        let yaml = r#"
model:
  c: 0.0
"#;

        let result = TrainingConfig::from_yaml(yaml);
        assert!(result.unwrap_err().to_string().contains("model:"));
    }
}

//! Workspace umbrella crate for BCW, the Breast Cancer Wisconsin classifier.
//!
//! This crate stitches the dataset and model layers into the training
//! pipeline: load samples, hold out a test split, fit, evaluate, and write
//! the artifact the HTTP server serves.

pub mod config;

pub use config::{ConfigLoadError, DatasetYamlConfig, OutputYamlConfig, TrainingConfig};
pub use dataset::{
    class_labels, load_csv, normalize_feature_name, parse_csv, Dataset, DatasetError, Diagnosis,
    Split, FEATURE_COUNT, FEATURE_NAMES,
};
pub use model::{
    evaluate, fit, fit_dataset, EvaluationMetrics, FitReport, LogisticModel,
    LogisticRegressionConfig, ModelArtifact, ModelError, Prediction, TrainingSummary,
};

use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;

/// Errors that can occur while running the training pipeline.
#[derive(Debug)]
pub enum PipelineError {
    Config(ConfigLoadError),
    Dataset(DatasetError),
    Model(ModelError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Config(err) => write!(f, "configuration failure: {err}"),
            PipelineError::Dataset(err) => write!(f, "dataset failure: {err}"),
            PipelineError::Model(err) => write!(f, "model failure: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Config(err) => Some(err),
            PipelineError::Dataset(err) => Some(err),
            PipelineError::Model(err) => Some(err),
        }
    }
}

impl From<ConfigLoadError> for PipelineError {
    fn from(value: ConfigLoadError) -> Self {
        PipelineError::Config(value)
    }
}

impl From<DatasetError> for PipelineError {
    fn from(value: DatasetError) -> Self {
        PipelineError::Dataset(value)
    }
}

impl From<ModelError> for PipelineError {
    fn from(value: ModelError) -> Self {
        PipelineError::Model(value)
    }
}

/// Summary of a completed training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub artifact_path: PathBuf,
    pub artifact: ModelArtifact,
}

impl TrainingReport {
    pub fn evaluation(&self) -> Option<&EvaluationMetrics> {
        self.artifact.evaluation.as_ref()
    }
}

/// Split, fit, and evaluate in memory. No files are touched.
pub fn train_on_dataset(
    data: &Dataset,
    cfg: &TrainingConfig,
) -> Result<ModelArtifact, PipelineError> {
    cfg.validate()?;
    let counts = data.class_counts();
    tracing::info!(
        samples = data.n_samples(),
        features = data.n_features(),
        classes = ?counts.0,
        "dataset ready"
    );

    let split = data.train_test_split(cfg.dataset.test_fraction, cfg.dataset.seed)?;
    tracing::info!(
        train = split.train.n_samples(),
        test = split.test.n_samples(),
        seed = cfg.dataset.seed,
        "data split into train and test sets"
    );

    tracing::info!(
        c = cfg.model.c,
        max_iter = cfg.model.max_iter,
        "fitting logistic regression"
    );
    let started = Instant::now();
    let (model, fit_report) = fit_dataset(&split.train, class_labels(), &cfg.model)?;
    tracing::info!(
        iterations = fit_report.iterations,
        converged = fit_report.converged,
        loss = fit_report.final_loss,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "model fitted"
    );

    let metrics = evaluate(&model, &split.test)?;
    tracing::info!(
        accuracy = %format!("{:.4}", metrics.accuracy),
        f1 = %format!("{:.4}", metrics.f1),
        precision = %format!("{:.4}", metrics.precision),
        recall = %format!("{:.4}", metrics.recall),
        "held-out evaluation"
    );

    let training = TrainingSummary {
        train_samples: split.train.n_samples(),
        test_samples: split.test.n_samples(),
        test_fraction: cfg.dataset.test_fraction,
        seed: cfg.dataset.seed,
        solver: cfg.model,
        fit: fit_report,
    };
    Ok(ModelArtifact::new(model, training, Some(metrics)))
}

/// Run the whole pipeline described by `cfg` and write the artifact.
pub fn run_training(cfg: &TrainingConfig) -> Result<TrainingReport, PipelineError> {
    let data = load_csv(&cfg.dataset.path)?;
    let artifact = train_on_dataset(&data, cfg)?;
    artifact.save(&cfg.output.artifact_path)?;
    tracing::info!(
        path = %cfg.output.artifact_path.display(),
        "training pipeline completed"
    );
    Ok(TrainingReport {
        artifact_path: cfg.output.artifact_path.clone(),
        artifact,
    })
}

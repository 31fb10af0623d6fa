//! BCW model layer.
//!
//! A binary logistic regression over standardized features, the metrics used
//! to judge it on held-out data, and the JSON artifact that carries it from
//! the trainer to the server.
//!
//! ## Contract
//!
//! - [`fit`] is deterministic: identical inputs and config give a
//!   bit-identical [`LogisticModel`].
//! - A [`LogisticModel`] is never mutated after fitting or loading; scoring
//!   takes `&self`.
//! - Scoring rejects vectors whose length differs from the model's feature
//!   count and vectors holding NaN or infinities.
//!
//! ## Example
//!
//! ```
//! use model::{fit, LogisticRegressionConfig};
//! use ndarray::array;
//!
//! let x = array![[1.0], [2.0], [8.0], [9.0]];
//! let y = [0, 0, 1, 1];
//! let (model, _report) = fit(
//!     x.view(),
//!     &y,
//!     vec!["size".into()],
//!     vec!["malignant".into(), "benign".into()],
//!     &LogisticRegressionConfig::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(model.predict(&[9.5]).unwrap().label, "benign");
//! ```

mod artifact;
mod config;
mod error;
mod linalg;
mod logistic;
mod metrics;
mod scaler;

pub use crate::artifact::{ModelArtifact, TrainingSummary, ALGORITHM, ARTIFACT_FORMAT_VERSION};
pub use crate::config::LogisticRegressionConfig;
pub use crate::error::ModelError;
pub use crate::logistic::{fit, fit_dataset, FitReport, LogisticModel, Prediction};
pub use crate::metrics::{evaluate, ConfusionMatrix, EvaluationMetrics};
pub use crate::scaler::StandardScaler;

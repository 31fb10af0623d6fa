//! BCW dataset layer.
//!
//! Loads the Wisconsin Diagnostic Breast Cancer samples into an
//! [`ndarray`] feature matrix with integer class targets, and produces the
//! seeded train/test split the trainer fits on.
//!
//! ## Conventions
//!
//! - Feature order is [`FEATURE_NAMES`]; the served model expects the same
//!   order.
//! - Class 0 is malignant, class 1 is benign ([`Diagnosis`]).
//! - Splits are a pure function of `(dataset, test_fraction, seed)`.

mod dataset;
mod error;
mod loader;
mod schema;

pub use crate::dataset::{ClassCounts, Dataset, Split};
pub use crate::error::DatasetError;
pub use crate::loader::{load_csv, parse_csv};
pub use crate::schema::{
    class_labels, normalize_feature_name, Diagnosis, FEATURE_COUNT, FEATURE_NAMES,
};

use ndarray::{Array2, ArrayView1, Axis};
use serde::Serialize;

use crate::error::DatasetError;

/// Tabular samples with integer class targets.
///
/// Row `i` of `features` belongs to `targets[i]`; columns follow
/// `feature_names`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    feature_names: Vec<String>,
    features: Array2<f64>,
    targets: Vec<usize>,
}

/// Result of [`Dataset::train_test_split`].
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Dataset,
    pub test: Dataset,
}

/// Per-class sample counts, indexed by class id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassCounts(pub Vec<usize>);

impl Dataset {
    pub fn new(
        feature_names: Vec<String>,
        features: Array2<f64>,
        targets: Vec<usize>,
    ) -> Result<Self, DatasetError> {
        if features.nrows() == 0 {
            return Err(DatasetError::EmptyDataset);
        }
        if features.nrows() != targets.len() {
            return Err(DatasetError::Inconsistent(format!(
                "{} feature rows but {} targets",
                features.nrows(),
                targets.len()
            )));
        }
        if features.ncols() != feature_names.len() {
            return Err(DatasetError::Inconsistent(format!(
                "{} feature columns but {} feature names",
                features.ncols(),
                feature_names.len()
            )));
        }
        Ok(Self {
            feature_names,
            features,
            targets,
        })
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn features(&self) -> &Array2<f64> {
        &self.features
    }

    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.features.row(index)
    }

    pub fn class_counts(&self) -> ClassCounts {
        let n_classes = self.targets.iter().copied().max().map_or(0, |m| m + 1);
        let mut counts = vec![0; n_classes];
        for &t in &self.targets {
            counts[t] += 1;
        }
        ClassCounts(counts)
    }

    /// Copy the given rows, in order, into a new dataset.
    pub fn select(&self, rows: &[usize]) -> Result<Self, DatasetError> {
        let features = self.features.select(Axis(0), rows);
        let targets = rows.iter().map(|&i| self.targets[i]).collect();
        Self::new(self.feature_names.clone(), features, targets)
    }

    /// Shuffle the rows with a seeded RNG and hold out `test_fraction` of them.
    ///
    /// The test side receives `ceil(n * test_fraction)` rows. Both sides must
    /// be non-empty. Identical `(dataset, test_fraction, seed)` always yield
    /// the identical split.
    pub fn train_test_split(&self, test_fraction: f64, seed: u64) -> Result<Split, DatasetError> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(DatasetError::InvalidSplit(format!(
                "test_fraction must be in (0, 1), got {test_fraction}"
            )));
        }
        let n = self.n_samples();
        let n_test = (n as f64 * test_fraction).ceil() as usize;
        if n_test == 0 || n_test >= n {
            return Err(DatasetError::InvalidSplit(format!(
                "{n} samples cannot be split with test_fraction {test_fraction}"
            )));
        }

        let mut order: Vec<usize> = (0..n).collect();
        let mut rng = fastrand::Rng::with_seed(seed);
        rng.shuffle(&mut order);

        let (test_rows, train_rows) = order.split_at(n_test);
        tracing::debug!(
            train = train_rows.len(),
            test = test_rows.len(),
            seed,
            "dataset split"
        );

        Ok(Split {
            train: self.select(train_rows)?,
            test: self.select(test_rows)?,
        })
    }
}

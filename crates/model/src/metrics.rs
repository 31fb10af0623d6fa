use dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::logistic::LogisticModel;

/// Binary confusion counts with class 1 as the positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_positive: usize,
}

impl ConfusionMatrix {
    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }
}

/// Held-out performance of a classifier.
///
/// Precision, recall and F1 treat class 1 as positive. A ratio whose
/// denominator is zero is reported as 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub samples: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub confusion: ConfusionMatrix,
}

impl EvaluationMetrics {
    pub fn from_predictions(y_true: &[usize], y_pred: &[usize]) -> Self {
        debug_assert_eq!(y_true.len(), y_pred.len());
        let mut cm = ConfusionMatrix::default();
        for (&t, &p) in y_true.iter().zip(y_pred) {
            match (t == 1, p == 1) {
                (false, false) => cm.true_negative += 1,
                (false, true) => cm.false_positive += 1,
                (true, false) => cm.false_negative += 1,
                (true, true) => cm.true_positive += 1,
            }
        }

        let precision = ratio(cm.true_positive, cm.true_positive + cm.false_positive);
        let recall = ratio(cm.true_positive, cm.true_positive + cm.false_negative);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            samples: cm.total(),
            accuracy: ratio(cm.true_positive + cm.true_negative, cm.total()),
            precision,
            recall,
            f1,
            confusion: cm,
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Score every row of `data` and compare against its targets.
pub fn evaluate(model: &LogisticModel, data: &Dataset) -> Result<EvaluationMetrics, ModelError> {
    let mut predicted = Vec::with_capacity(data.n_samples());
    for i in 0..data.n_samples() {
        let row = data.row(i).to_vec();
        predicted.push(model.predict(&row)?.class_index);
    }
    Ok(EvaluationMetrics::from_predictions(data.targets(), &predicted))
}

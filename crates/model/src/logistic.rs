//! Binary logistic regression fitted by damped Newton iterations.

use dataset::Dataset;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::config::LogisticRegressionConfig;
use crate::error::ModelError;
use crate::linalg::cholesky_solve;
use crate::scaler::StandardScaler;

/// Keeps the unpenalized intercept row of the Hessian strictly positive.
const INTERCEPT_JITTER: f64 = 1e-10;
/// Armijo sufficient-decrease constant for the line search.
const ARMIJO: f64 = 1e-4;
const MIN_STEP: f64 = 1e-10;

/// A fitted binary classifier.
///
/// Immutable once built; scoring only borrows it, so one instance can be
/// shared across threads behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    /// Feature names in input order.
    pub feature_names: Vec<String>,
    /// Class labels indexed by class id; exactly two.
    pub classes: Vec<String>,
    pub scaler: StandardScaler,
    /// Weights over standardized features.
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Outcome of scoring one feature vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub class_index: usize,
    pub label: String,
    /// Probability of the predicted class.
    pub probability: f64,
}

/// Solver diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    pub iterations: usize,
    pub converged: bool,
    pub final_loss: f64,
}

impl LogisticModel {
    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Check that every parameter block agrees on the feature count and is finite.
    pub fn validate(&self) -> Result<(), ModelError> {
        let n = self.coefficients.len();
        if n == 0 {
            return Err(ModelError::CorruptArtifact("model has no features".into()));
        }
        if self.feature_names.len() != n
            || self.scaler.mean.len() != n
            || self.scaler.scale.len() != n
        {
            return Err(ModelError::CorruptArtifact(format!(
                "parameter lengths disagree: {} coefficients, {} names, {} means, {} scales",
                n,
                self.feature_names.len(),
                self.scaler.mean.len(),
                self.scaler.scale.len()
            )));
        }
        if self.classes.len() != 2 {
            return Err(ModelError::CorruptArtifact(format!(
                "expected 2 classes, found {}",
                self.classes.len()
            )));
        }
        let mut params = self
            .coefficients
            .iter()
            .chain(&self.scaler.mean)
            .chain(std::iter::once(&self.intercept));
        if params.any(|v| !v.is_finite()) {
            return Err(ModelError::CorruptArtifact("non-finite parameter".into()));
        }
        if self.scaler.scale.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
            return Err(ModelError::CorruptArtifact("scale must be positive".into()));
        }
        Ok(())
    }

    fn check_input(&self, features: &[f64]) -> Result<(), ModelError> {
        if features.len() != self.n_features() {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.n_features(),
                got: features.len(),
            });
        }
        if let Some(index) = features.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteFeature { index });
        }
        Ok(())
    }

    /// Linear score before the sigmoid.
    ///
    /// Extreme but finite inputs can overflow once scaled; such scores are
    /// rejected rather than turned into a label.
    pub fn decision_function(&self, features: &[f64]) -> Result<f64, ModelError> {
        self.check_input(features)?;
        let score = features
            .iter()
            .zip(&self.coefficients)
            .enumerate()
            .fold(self.intercept, |acc, (j, (x, w))| {
                acc + w * self.scaler.apply(j, *x)
            });
        if !score.is_finite() {
            return Err(ModelError::NonFiniteScore);
        }
        Ok(score)
    }

    /// Probability of class 1.
    pub fn predict_proba(&self, features: &[f64]) -> Result<f64, ModelError> {
        self.decision_function(features).map(sigmoid)
    }

    /// Most likely class; a probability of exactly 0.5 goes to class 1.
    pub fn predict(&self, features: &[f64]) -> Result<Prediction, ModelError> {
        let p1 = self.predict_proba(features)?;
        let (class_index, probability) = if p1 >= 0.5 { (1, p1) } else { (0, 1.0 - p1) };
        Ok(Prediction {
            class_index,
            label: self.classes[class_index].clone(),
            probability,
        })
    }
}

/// Fit a model on a [`Dataset`], labelling classes with `classes`.
pub fn fit_dataset(
    data: &Dataset,
    classes: Vec<String>,
    cfg: &LogisticRegressionConfig,
) -> Result<(LogisticModel, FitReport), ModelError> {
    fit(
        data.features().view(),
        data.targets(),
        data.feature_names().to_vec(),
        classes,
        cfg,
    )
}

/// Fit an L2-regularized logistic regression.
///
/// Features are standardized first. Each Newton step solves
/// `H * delta = g` by Cholesky and is damped by a backtracking line search on
/// the objective, so the loss never increases between iterations. The result
/// depends only on the inputs.
pub fn fit(
    x: ArrayView2<'_, f64>,
    targets: &[usize],
    feature_names: Vec<String>,
    classes: Vec<String>,
    cfg: &LogisticRegressionConfig,
) -> Result<(LogisticModel, FitReport), ModelError> {
    cfg.validate()?;
    let (n, d) = x.dim();
    if n != targets.len() {
        return Err(ModelError::InvalidTargets(format!(
            "{n} rows but {} targets",
            targets.len()
        )));
    }
    if feature_names.len() != d {
        return Err(ModelError::InvalidConfig(format!(
            "{d} feature columns but {} names",
            feature_names.len()
        )));
    }
    if classes.len() != 2 {
        return Err(ModelError::InvalidConfig(format!(
            "binary classifier needs 2 class labels, got {}",
            classes.len()
        )));
    }
    if let Some(bad) = targets.iter().find(|&&t| t > 1) {
        return Err(ModelError::InvalidTargets(format!("class index {bad} is not 0 or 1")));
    }
    if !(targets.contains(&0) && targets.contains(&1)) {
        return Err(ModelError::InvalidTargets(
            "training targets must contain both classes".into(),
        ));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::InvalidTargets("feature matrix holds non-finite values".into()));
    }

    let scaler = StandardScaler::fit(x);
    let design = with_intercept(&scaler.transform(x));
    let y: Array1<f64> = targets.iter().map(|&t| t as f64).collect();

    let mut theta = Array1::<f64>::zeros(d + 1);
    let mut loss = objective(&design, &y, &theta, cfg.c);
    let mut report = FitReport {
        iterations: 0,
        converged: false,
        final_loss: loss,
    };

    for iter in 1..=cfg.max_iter {
        let p = design.dot(&theta).mapv(sigmoid);
        let grad = gradient(&design, &y, &p, &theta, cfg.c);
        if max_abs(&grad) <= cfg.tol {
            report.converged = true;
            break;
        }

        let hess = hessian(&design, &p, cfg.c);
        let delta = cholesky_solve(&hess, &grad).ok_or(ModelError::Singular)?;
        let slope = grad.dot(&delta);

        let mut step = 1.0;
        let mut candidate = &theta - &delta;
        let mut candidate_loss = objective(&design, &y, &candidate, cfg.c);
        while candidate_loss > loss - ARMIJO * step * slope && step > MIN_STEP {
            step *= 0.5;
            candidate = &theta - &(&delta * step);
            candidate_loss = objective(&design, &y, &candidate, cfg.c);
        }

        theta = candidate;
        loss = candidate_loss;
        report.iterations = iter;
        report.final_loss = loss;
        tracing::trace!(iter, loss, step, "newton step");
    }

    if !report.converged {
        // The last step may have landed inside tolerance.
        let p = design.dot(&theta).mapv(sigmoid);
        report.converged = max_abs(&gradient(&design, &y, &p, &theta, cfg.c)) <= cfg.tol;
    }
    if !report.converged {
        tracing::warn!(
            max_iter = cfg.max_iter,
            loss = report.final_loss,
            "logistic regression did not converge"
        );
    }

    let model = LogisticModel {
        feature_names,
        classes,
        scaler,
        coefficients: theta.iter().skip(1).copied().collect(),
        intercept: theta[0],
    };
    Ok((model, report))
}

fn with_intercept(z: &Array2<f64>) -> Array2<f64> {
    let (n, d) = z.dim();
    let mut out = Array2::<f64>::ones((n, d + 1));
    out.slice_mut(ndarray::s![.., 1..]).assign(z);
    out
}

fn objective(design: &Array2<f64>, y: &Array1<f64>, theta: &Array1<f64>, c: f64) -> f64 {
    let scores = design.dot(theta);
    let data_loss: f64 = scores
        .iter()
        .zip(y.iter())
        .map(|(&s, &t)| softplus(s) - t * s)
        .sum();
    let penalty: f64 = theta.iter().skip(1).map(|w| w * w).sum();
    0.5 * penalty + c * data_loss
}

fn gradient(
    design: &Array2<f64>,
    y: &Array1<f64>,
    p: &Array1<f64>,
    theta: &Array1<f64>,
    c: f64,
) -> Array1<f64> {
    let residual = p - y;
    let mut grad = design.t().dot(&residual) * c;
    for j in 1..grad.len() {
        grad[j] += theta[j];
    }
    grad
}

fn hessian(design: &Array2<f64>, p: &Array1<f64>, c: f64) -> Array2<f64> {
    let weights = p.mapv(|pi| pi * (1.0 - pi) * c);
    let weighted = design * &weights.insert_axis(Axis(1));
    let mut hess = design.t().dot(&weighted);
    hess[[0, 0]] += INTERCEPT_JITTER;
    for j in 1..hess.nrows() {
        hess[[j, j]] += 1.0;
    }
    hess
}

fn max_abs(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0_f64, |m, x| m.max(x.abs()))
}

#[inline]
pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `ln(1 + e^z)` without overflow.
#[inline]
fn softplus(z: f64) -> f64 {
    if z > 0.0 {
        z + (-z).exp().ln_1p()
    } else {
        z.exp().ln_1p()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn labels() -> Vec<String> {
        vec!["malignant".into(), "benign".into()]
    }

    fn hand_built() -> LogisticModel {
        LogisticModel {
            feature_names: vec!["a".into(), "b".into()],
            classes: labels(),
            scaler: StandardScaler {
                mean: vec![0.0, 0.0],
                scale: vec![1.0, 1.0],
            },
            coefficients: vec![2.0, -1.0],
            intercept: 0.0,
        }
    }

    /// Two noisy clusters along the first axis.
    fn clusters(n_per_class: usize, seed: u64) -> (Array2<f64>, Vec<usize>) {
        let mut rng = fastrand::Rng::with_seed(seed);
        let n = n_per_class * 2;
        let mut x = Array2::<f64>::zeros((n, 2));
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            let class = i % 2;
            let centre = if class == 1 { 3.0 } else { -3.0 };
            x[[i, 0]] = centre + rng.f64() * 4.0 - 2.0;
            x[[i, 1]] = rng.f64() * 100.0;
            y.push(class);
        }
        (x, y)
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(800.0) <= 1.0);
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(softplus(800.0).is_finite());
        assert!((softplus(0.0) - std::f64::consts::LN_2).abs() < 1e-12);
    }

    #[test]
    fn predict_picks_more_likely_class() {
        let model = hand_built();
        let pos = model.predict(&[1.0, 0.0]).unwrap();
        assert_eq!(pos.class_index, 1);
        assert_eq!(pos.label, "benign");
        assert!((pos.probability - sigmoid(2.0)).abs() < 1e-12);

        let neg = model.predict(&[-1.0, 0.0]).unwrap();
        assert_eq!(neg.class_index, 0);
        assert_eq!(neg.label, "malignant");
        assert!((neg.probability - (1.0 - sigmoid(-2.0))).abs() < 1e-12);
    }

    #[test]
    fn overflowing_score_is_rejected() {
        let mut model = hand_built();
        model.scaler.scale = vec![0.003, 0.003];
        // Each scaled term overflows and the opposite-signed weights meet as inf - inf.
        assert!(matches!(
            model.predict(&[1e307, 1e307]),
            Err(ModelError::NonFiniteScore)
        ));
        assert!(matches!(
            model.decision_function(&[1e307, 0.0]),
            Err(ModelError::NonFiniteScore)
        ));
        assert!(model.predict(&[1.0, 1.0]).is_ok());
    }

    #[test]
    fn tie_goes_to_class_one() {
        let p = hand_built().predict(&[0.0, 0.0]).unwrap();
        assert_eq!(p.class_index, 1);
        assert_eq!(p.probability, 0.5);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let err = hand_built().predict(&[1.0]).unwrap_err();
        assert!(matches!(
            err,
            ModelError::FeatureCountMismatch {
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let err = hand_built().predict(&[1.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, ModelError::NonFiniteFeature { index: 1 }));
    }

    #[test]
    fn fit_separates_clusters() {
        let (x, y) = clusters(100, 11);
        let (model, report) = fit(
            x.view(),
            &y,
            vec!["signal".into(), "noise".into()],
            labels(),
            &LogisticRegressionConfig::default(),
        )
        .unwrap();
        assert!(report.converged, "{report:?}");
        assert!(report.iterations < 50);
        assert!(model.coefficients[0] > 0.0);
        assert!(model.coefficients[0].abs() > model.coefficients[1].abs());

        let correct = x
            .rows()
            .into_iter()
            .zip(&y)
            .filter(|(row, t)| model.predict(row.as_slice().unwrap()).unwrap().class_index == **t)
            .count();
        assert!(correct as f64 / y.len() as f64 > 0.95);
    }

    #[test]
    fn fit_is_deterministic() {
        let (x, y) = clusters(40, 5);
        let names = vec!["a".to_string(), "b".to_string()];
        let cfg = LogisticRegressionConfig::default();
        let (a, _) = fit(x.view(), &y, names.clone(), labels(), &cfg).unwrap();
        let (b, _) = fit(x.view(), &y, names, labels(), &cfg).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn stronger_regularization_shrinks_weights() {
        let (x, y) = clusters(50, 9);
        let names = vec!["a".to_string(), "b".to_string()];
        let (loose, _) = fit(
            x.view(),
            &y,
            names.clone(),
            labels(),
            &LogisticRegressionConfig::new().with_c(10.0),
        )
        .unwrap();
        let (tight, _) = fit(
            x.view(),
            &y,
            names,
            labels(),
            &LogisticRegressionConfig::new().with_c(0.01),
        )
        .unwrap();
        assert!(tight.coefficients[0].abs() < loose.coefficients[0].abs());
    }

    #[test]
    fn perfectly_separable_data_stays_finite() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let y = [0, 0, 1, 1];
        let (model, report) = fit(
            x.view(),
            &y,
            vec!["a".into()],
            labels(),
            &LogisticRegressionConfig::default(),
        )
        .unwrap();
        assert!(model.validate().is_ok());
        assert!(report.final_loss.is_finite());
        assert_eq!(model.predict(&[0.0]).unwrap().class_index, 0);
        assert_eq!(model.predict(&[3.0]).unwrap().class_index, 1);
    }

    #[test]
    fn single_class_targets_are_rejected() {
        let x = array![[0.0], [1.0]];
        let res = fit(
            x.view(),
            &[1, 1],
            vec!["a".into()],
            labels(),
            &LogisticRegressionConfig::default(),
        );
        assert!(matches!(res, Err(ModelError::InvalidTargets(_))));
    }

    #[test]
    fn out_of_range_targets_are_rejected() {
        let x = array![[0.0], [1.0]];
        let res = fit(
            x.view(),
            &[0, 2],
            vec!["a".into()],
            labels(),
            &LogisticRegressionConfig::default(),
        );
        assert!(matches!(res, Err(ModelError::InvalidTargets(_))));
    }

    #[test]
    fn validate_catches_length_drift() {
        let mut model = hand_built();
        model.scaler.mean.pop();
        assert!(matches!(model.validate(), Err(ModelError::CorruptArtifact(_))));

        let mut model = hand_built();
        model.scaler.scale[0] = 0.0;
        assert!(model.validate().is_err());

        let mut model = hand_built();
        model.intercept = f64::INFINITY;
        assert!(model.validate().is_err());
    }
}

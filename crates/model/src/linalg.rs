//! Dense symmetric solve for the Newton step.

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

/// Solve `a * x = b` for symmetric positive-definite `a` via Cholesky.
///
/// Returns `None` when `a` is not positive definite.
pub(crate) fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    debug_assert_eq!(a.ncols(), n);
    debug_assert_eq!(b.len(), n);

    let lhs = DMatrix::from_fn(n, n, |i, j| a[[i, j]]);
    let rhs = DVector::from_iterator(n, b.iter().copied());
    let x = lhs.cholesky()?.solve(&rhs);
    if x.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(x.iter().copied().collect())
}

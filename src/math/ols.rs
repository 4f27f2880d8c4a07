//! Ordinary least squares.
//!
//! The Hamilton trend is a small regression problem: a few dozen quarterly
//! observations against an intercept and four lags.
//!
//! Implementation choices:
//! - We solve with SVD so tall and (degenerate) wide design matrices both
//!   work. Nalgebra's `QR::solve` is meant for square systems and panics on
//!   non-square ones.
//! - Output level series move slowly, so lagged regressors are close to
//!   collinear; we retry with looser singular-value tolerances.

use nalgebra::{DMatrix, DVector};

use crate::error::PipelineError;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Coefficients and in-sample fitted values of an OLS fit.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Intercept first, then one coefficient per regressor column.
    pub coefficients: Vec<f64>,
    pub fitted: Vec<f64>,
}

/// Regress `y` on an intercept plus the given regressor rows.
///
/// `rows[i]` holds the regressors for observation `i`.
pub fn fit_with_intercept(rows: &[Vec<f64>], y: &[f64]) -> Result<OlsFit, PipelineError> {
    if rows.len() != y.len() {
        return Err(PipelineError::InvalidInput(format!(
            "regression has {} regressor rows for {} observations",
            rows.len(),
            y.len()
        )));
    }
    if rows.is_empty() {
        return Err(PipelineError::FilterDomain {
            filter: "OLS regression",
            required: 1,
            actual: 0,
        });
    }

    let k = rows[0].len() + 1;
    let mut x = DMatrix::<f64>::zeros(rows.len(), k);
    for (i, row) in rows.iter().enumerate() {
        if row.len() + 1 != k {
            return Err(PipelineError::InvalidInput("ragged regressor rows".into()));
        }
        x[(i, 0)] = 1.0;
        for (j, v) in row.iter().enumerate() {
            x[(i, j + 1)] = *v;
        }
    }
    let yv = DVector::from_row_slice(y);

    let beta = solve_least_squares(&x, &yv)
        .ok_or_else(|| PipelineError::Arithmetic("least squares system is singular".into()))?;
    let fitted = &x * &beta;

    Ok(OlsFit {
        coefficients: beta.iter().copied().collect(),
        fitted: fitted.iter().copied().collect(),
    })
}

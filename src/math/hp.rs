//! Hodrick-Prescott trend/cycle decomposition.
//!
//! The trend `τ` minimizes
//!
//! ```text
//! Σ (y_t - τ_t)^2 + λ Σ (τ_{t+1} - 2τ_t + τ_{t-1})^2
//! ```
//!
//! which is the linear system `(I + λ KᵀK) τ = y`, with `K` the
//! `(n-2) × n` second-difference operator. The system matrix is symmetric
//! positive definite, so we solve it with a Cholesky factorization. This is
//! the standard two-sided filter, not the one-sided (real-time) variant.

use log::warn;
use nalgebra::{DMatrix, DVector};

use crate::domain::Series;
use crate::error::PipelineError;

/// Shortest input the filter accepts.
pub const HP_MIN_OBS: usize = 4;

/// Cycle and trend components, aligned with the input.
#[derive(Debug, Clone, PartialEq)]
pub struct HpDecomposition {
    pub cycle: Vec<f64>,
    pub trend: Vec<f64>,
}

/// Decompose `values` into cycle + trend.
pub fn hp_filter(values: &[f64], lambda: f64) -> Result<HpDecomposition, PipelineError> {
    let n = values.len();
    if n < HP_MIN_OBS {
        return Err(PipelineError::FilterDomain {
            filter: "HP filter",
            required: HP_MIN_OBS,
            actual: n,
        });
    }
    if !(lambda.is_finite() && lambda >= 0.0) {
        return Err(PipelineError::InvalidInput(format!("HP lambda must be finite and >= 0, got {lambda}")));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(PipelineError::InvalidInput("HP filter input contains non-finite values".into()));
    }

    let mut k = DMatrix::<f64>::zeros(n - 2, n);
    for i in 0..n - 2 {
        k[(i, i)] = 1.0;
        k[(i, i + 1)] = -2.0;
        k[(i, i + 2)] = 1.0;
    }
    let system = DMatrix::<f64>::identity(n, n) + (k.transpose() * &k) * lambda;

    let chol = system
        .cholesky()
        .ok_or_else(|| PipelineError::Arithmetic("HP system matrix is not positive definite".into()))?;
    let y = DVector::from_row_slice(values);
    let trend = chol.solve(&y);

    let trend: Vec<f64> = trend.iter().copied().collect();
    let cycle = values.iter().zip(&trend).map(|(v, t)| v - t).collect();

    Ok(HpDecomposition { cycle, trend })
}

/// HP trend of the observed values of a series, keyed by the same periods.
///
/// Missing values are dropped first. The filter treats its input as
/// equally spaced, so a series with skipped periods is still filtered but
/// logged.
pub fn hp_trend(series: &Series, lambda: f64) -> Result<Series, PipelineError> {
    let observed = series.dropna();
    if !observed.is_contiguous() {
        warn!(
            "HP filter input '{}' skips periods between {:?} and {:?}",
            series.name(),
            observed.first_period(),
            observed.last_period()
        );
    }

    let values: Vec<f64> = observed.observed().map(|(_, v)| v).collect();
    let decomposition = hp_filter(&values, lambda)?;

    Series::from_points(
        series.name(),
        series.frequency(),
        observed.periods().zip(decomposition.trend),
    )
}

//! Exact Fisher relation between nominal and real rates.

use crate::domain::Series;
use crate::error::PipelineError;
use crate::series::inner_join;

/// Real rate (%) implied by a nominal rate (%) and inflation (%).
///
/// Uses the exact relation `(1 + i) / (1 + π) - 1`, not the additive
/// approximation `i - π`.
pub fn fisher(nominal_pct: f64, inflation_pct: f64) -> Result<f64, PipelineError> {
    let denominator = 1.0 + inflation_pct / 100.0;
    if denominator == 0.0 {
        return Err(PipelineError::Arithmetic(format!(
            "Fisher conversion undefined for inflation of {inflation_pct}%"
        )));
    }
    Ok(((1.0 + nominal_pct / 100.0) / denominator - 1.0) * 100.0)
}

/// Element-wise Fisher conversion over the common periods of two series.
pub fn fisher_series(
    nominal: &Series,
    inflation: &Series,
    name: impl Into<String>,
) -> Result<Series, PipelineError> {
    let joined = inner_join(&[nominal, inflation])?;
    let columns = joined.columns();
    let real = columns[0]
        .values
        .iter()
        .zip(&columns[1].values)
        .map(|(i, pi)| fisher(*i, *pi))
        .collect::<Result<Vec<f64>, _>>()?;

    Series::from_points(
        name,
        nominal.frequency(),
        joined.periods().iter().copied().zip(real),
    )
}

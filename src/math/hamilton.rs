//! Hamilton regression trend.
//!
//! Potential output is the fitted value of
//!
//! ```text
//! y_t = β0 + β1 y_{t-8} + β2 y_{t-9} + β3 y_{t-10} + β4 y_{t-11} + ε_t
//! ```
//!
//! Lags are resolved by period arithmetic, not by position, so a quarter
//! only gets a fitted value when all four lagged quarters are observed.
//! Quarters without one stay in the output index as missing values.

use log::debug;

use crate::domain::Series;
use crate::error::PipelineError;
use crate::math::ols::fit_with_intercept;

pub const HAMILTON_LAGS: [i64; 4] = [8, 9, 10, 11];

/// Shortest input that leaves at least one estimable period.
pub const HAMILTON_MIN_OBS: usize = 12;

/// Fitted Hamilton trend over the full index of `series`.
pub fn hamilton_trend(series: &Series) -> Result<Series, PipelineError> {
    let n = series.observed().count();
    if n < HAMILTON_MIN_OBS {
        return Err(PipelineError::FilterDomain {
            filter: "Hamilton regression",
            required: HAMILTON_MIN_OBS,
            actual: n,
        });
    }

    let mut targets = Vec::new();
    let mut rows = Vec::new();
    let mut y = Vec::new();
    for (period, value) in series.observed() {
        let lags: Option<Vec<f64>> = HAMILTON_LAGS
            .iter()
            .map(|lag| series.get(&period.offset(-lag)))
            .collect();
        if let Some(lags) = lags {
            targets.push(period);
            rows.push(lags);
            y.push(value);
        }
    }

    if rows.is_empty() {
        return Err(PipelineError::FilterDomain {
            filter: "Hamilton regression (rows with all lags observed)",
            required: 1,
            actual: 0,
        });
    }

    let fit = fit_with_intercept(&rows, &y)?;
    debug!(
        "hamilton trend for '{}': {} estimable periods, coefficients {:?}",
        series.name(),
        rows.len(),
        fit.coefficients
    );

    let mut trend = Series::new(series.name(), series.frequency());
    let mut fitted = targets.into_iter().zip(fit.fitted).peekable();
    for period in series.periods() {
        let value = match fitted.peek() {
            Some((p, v)) if *p == period => {
                let v = *v;
                fitted.next();
                Some(v)
            }
            _ => None,
        };
        trend.insert(period, value)?;
    }
    Ok(trend)
}

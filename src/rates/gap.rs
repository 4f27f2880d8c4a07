//! Output-gap estimators.
//!
//! Three variants, all quarterly and expressed in percent of potential:
//!
//! - official: the central bank's published series
//! - HP: GDP relative to its HP trend
//! - Hamilton: GDP relative to its Hamilton regression trend

use log::warn;

use crate::domain::{Frequency, GapObservation, GdpObservation, Period, Series};
use crate::error::PipelineError;
use crate::math::{hamilton_trend, hp_trend};

/// Quarterly GDP series keyed by the quarter of each observation date.
pub fn gdp_series(rows: &[GdpObservation], name: &str) -> Result<Series, PipelineError> {
    Series::from_points(
        name,
        Frequency::Quarterly,
        rows.iter()
            .map(|r| (Period::containing(r.date, Frequency::Quarterly), r.value)),
    )
}

/// The published output gap, keyed by parsed quarter labels.
///
/// Rows with non-finite values are skipped; unparseable labels fail.
pub fn official_gap(rows: &[GapObservation], name: &str) -> Result<Series, PipelineError> {
    let mut series = Series::new(name, Frequency::Quarterly);
    for row in rows {
        if !row.gap_pct.is_finite() {
            warn!("skipping official gap row '{}' with non-finite value", row.quarter_label);
            continue;
        }
        series.insert(Period::parse_quarter(&row.quarter_label)?, Some(row.gap_pct))?;
    }
    Ok(series)
}

/// `(actual / potential - 1) * 100` over the index of `actual`.
///
/// Periods where potential is missing stay in the index as missing.
pub fn output_gap(actual: &Series, potential: &Series, name: &str) -> Result<Series, PipelineError> {
    let mut gap = Series::new(name, actual.frequency());
    for (period, value) in actual.iter() {
        let pct = match (value, potential.get(&period)) {
            (Some(_), Some(p)) if p == 0.0 => {
                return Err(PipelineError::Arithmetic(format!(
                    "potential output is zero at {period}"
                )));
            }
            (Some(a), Some(p)) => Some((a / p - 1.0) * 100.0),
            _ => None,
        };
        gap.insert(period, pct)?;
    }
    Ok(gap)
}

/// Output gap against the HP trend of `gdp`.
pub fn hp_output_gap(gdp: &Series, lambda: f64, name: &str) -> Result<Series, PipelineError> {
    let potential = hp_trend(gdp, lambda)?;
    output_gap(gdp, &potential, name)
}

/// Output gap against the Hamilton trend of `gdp`.
pub fn hamilton_output_gap(gdp: &Series, name: &str) -> Result<Series, PipelineError> {
    let potential = hamilton_trend(gdp)?;
    output_gap(gdp, &potential, name)
}

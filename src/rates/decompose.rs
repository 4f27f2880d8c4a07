//! Gap-adjusted real-rate decomposition.
//!
//! ```text
//! r(t) = R(t) + (G(t) - 0.84 · G(t-1)) / 0.75
//! ```
//!
//! `R` is the survey-based neutral-rate proxy and `G` an output-gap series.
//! `t-1` is the previous row of the joined, gap-free table (not the previous
//! calendar quarter), and the first row has no lag so it is dropped.

use crate::domain::Series;
use crate::error::PipelineError;
use crate::series::inner_join;

/// Persistence of the output gap in the IS curve.
pub const GAP_PERSISTENCE: f64 = 0.84;

/// Sensitivity of the output gap to the real-rate gap.
pub const RATE_SENSITIVITY: f64 = 0.75;

/// Decompose `neutral` against one output-gap variant.
pub fn decompose(neutral: &Series, gap: &Series, name: impl Into<String>) -> Result<Series, PipelineError> {
    let joined = inner_join(&[neutral, gap])?;
    if joined.len() < 2 {
        return Err(PipelineError::FilterDomain {
            filter: "real-rate decomposition",
            required: 2,
            actual: joined.len(),
        });
    }

    let r = &joined.columns()[0].values;
    let g = &joined.columns()[1].values;
    let periods = joined.periods();

    let points = (1..joined.len()).map(|t| {
        let value = r[t] + (g[t] - GAP_PERSISTENCE * g[t - 1]) / RATE_SENSITIVITY;
        (periods[t], value)
    });

    Series::from_points(name, neutral.frequency(), points.collect::<Vec<_>>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Frequency, Period};
    use approx::assert_abs_diff_eq;

    fn q(year: i32, quarter: u32) -> Period {
        Period::quarter(year, quarter).unwrap()
    }

    #[test]
    fn constant_gap_two_periods() {
        let r = Series::from_points("r", Frequency::Quarterly, [(q(2020, 1), 4.0), (q(2020, 2), 4.5)]).unwrap();
        let g = Series::from_points("g", Frequency::Quarterly, [(q(2020, 1), 5.0), (q(2020, 2), 5.0)]).unwrap();

        let out = decompose(&r, &g, "out").unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.get(&q(2020, 1)), None);
        assert_abs_diff_eq!(
            out.get(&q(2020, 2)).unwrap(),
            4.5 + 5.0 * (1.0 - 0.84) / 0.75,
            epsilon = 1e-12
        );
    }

    #[test]
    fn lag_is_previous_surviving_row() {
        let r = Series::from_points(
            "r",
            Frequency::Quarterly,
            [(q(2020, 1), 1.0), (q(2020, 2), 1.0), (q(2020, 3), 1.0)],
        )
        .unwrap();
        let mut g = Series::new("g", Frequency::Quarterly);
        g.insert(q(2020, 1), Some(2.0)).unwrap();
        g.insert(q(2020, 2), None).unwrap();
        g.insert(q(2020, 3), Some(3.0)).unwrap();

        let out = decompose(&r, &g, "out").unwrap();
        assert_eq!(out.len(), 1);
        // 2020Q2 was dropped, so 2020Q3 lags against 2020Q1
        assert_abs_diff_eq!(
            out.get(&q(2020, 3)).unwrap(),
            1.0 + (3.0 - 0.84 * 2.0) / 0.75,
            epsilon = 1e-12
        );
    }

    #[test]
    fn single_joined_row_is_a_domain_error() {
        let r = Series::from_points("r", Frequency::Quarterly, [(q(2020, 1), 1.0)]).unwrap();
        let g = Series::from_points("g", Frequency::Quarterly, [(q(2020, 1), 1.0)]).unwrap();
        assert!(matches!(decompose(&r, &g, "out"), Err(PipelineError::FilterDomain { .. })));
    }
}

//! Deterministic synthetic inputs.
//!
//! Used by `nr run --offline` and by tests. Every table is generated from
//! smooth closed-form paths (no RNG), so the same arguments always produce the
//! same bundle and therefore the same cache key.
//!
//! Shapes mirror the live sources:
//! - Focus rows on two dates per month, for reference years t..t+4, plus rows
//!   with a different calculation basis that the pipeline must ignore
//! - GDP starting 16 quarters before the survey window (the live GDP history
//!   is much longer than the survey history)
//! - official gap labelled `YYYYTn`
//! - weekly NTN-B quotes for 2035 and 2045 plus an unrelated bond class

use chrono::{Duration, NaiveDate};

use crate::data::RawSource;
use crate::domain::{
    BondQuote, Frequency, GapObservation, GdpObservation, INDICATOR_IPCA, INDICATOR_SELIC, NTNB_CLASS, Period,
    RawInputs, SurveyObservation,
};
use crate::error::PipelineError;

/// Extra GDP history before the survey window.
const GDP_LEAD_QUARTERS: i64 = 16;

/// Offline source backed by [`synthetic_inputs`].
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    pub first_quarter: Period,
    pub quarters: usize,
    pub fetched_on: NaiveDate,
}

impl RawSource for SyntheticSource {
    fn load(&self) -> Result<RawInputs, PipelineError> {
        synthetic_inputs(self.first_quarter, self.quarters, self.fetched_on)
    }
}

/// Build a raw bundle covering `quarters` quarters from `first_quarter`.
pub fn synthetic_inputs(
    first_quarter: Period,
    quarters: usize,
    fetched_on: NaiveDate,
) -> Result<RawInputs, PipelineError> {
    if first_quarter.frequency() != Frequency::Quarterly {
        return Err(PipelineError::InvalidInput("synthetic window must start on a quarter".into()));
    }
    if quarters == 0 {
        return Err(PipelineError::InvalidInput("synthetic window must span at least one quarter".into()));
    }

    let start = first_quarter.start_date();
    let end = first_quarter.offset(quarters as i64).start_date();

    Ok(RawInputs {
        fetched_on,
        surveys: synthetic_surveys(start, end),
        gdp: synthetic_gdp(first_quarter, quarters),
        official_gap: synthetic_gap(first_quarter, quarters),
        bonds: synthetic_bonds(start, end),
    })
}

fn synthetic_surveys(start: NaiveDate, end: NaiveDate) -> Vec<SurveyObservation> {
    let mut out = Vec::new();
    let mut month = Period::containing(start, Frequency::Monthly);
    let mut k = 0.0_f64;

    while month.start_date() < end {
        for day in [5, 20] {
            let date = month.start_date() + Duration::days(day - 1);
            let year = month.year();
            for ahead in 0..=4 {
                let horizon = f64::from(ahead);
                let ipca = 3.25 + 1.5 * (-horizon).exp() + 0.6 * (0.35 * k).sin() / (1.0 + horizon);
                let selic = 8.5 + 3.0 * (-0.7 * horizon).exp() + 1.2 * (0.2 * k).cos() / (1.0 + horizon);
                for (indicator, median) in [(INDICATOR_IPCA, ipca), (INDICATOR_SELIC, selic)] {
                    out.push(SurveyObservation {
                        observation_date: date,
                        indicator: indicator.to_string(),
                        reference_year: (year + ahead).to_string(),
                        median,
                        calculation_basis: 0,
                    });
                }
            }
            // A different calculation basis; must never reach the pipeline output.
            out.push(SurveyObservation {
                observation_date: date,
                indicator: INDICATOR_IPCA.to_string(),
                reference_year: (year + 1).to_string(),
                median: 99.0,
                calculation_basis: 1,
            });
            k += 1.0;
        }
        month = month.offset(1);
    }
    out
}

fn synthetic_gdp(first_quarter: Period, quarters: usize) -> Vec<GdpObservation> {
    let total = quarters as i64 + GDP_LEAD_QUARTERS;
    (0..total)
        .map(|i| {
            let t = i as f64;
            GdpObservation {
                date: first_quarter.offset(i - GDP_LEAD_QUARTERS).start_date(),
                value: 150.0 * (1.005_f64).powf(t) * (1.0 + 0.012 * (0.55 * t).sin()),
            }
        })
        .collect()
}

fn synthetic_gap(first_quarter: Period, quarters: usize) -> Vec<GapObservation> {
    (0..quarters)
        .map(|i| {
            let p = first_quarter.offset(i as i64);
            GapObservation {
                quarter_label: format!("{}T{}", p.year(), p.index_in_year()),
                gap_pct: 1.2 * (0.5 * i as f64).sin() - 0.3,
            }
        })
        .collect()
}

fn synthetic_bonds(start: NaiveDate, end: NaiveDate) -> Vec<BondQuote> {
    let maturities = [
        (NTNB_CLASS, NaiveDate::from_ymd_opt(2035, 5, 15), 5.6, 0.4),
        (NTNB_CLASS, NaiveDate::from_ymd_opt(2045, 5, 15), 5.9, 0.3),
        ("Tesouro Prefixado", NaiveDate::from_ymd_opt(2035, 1, 1), 11.5, 1.0),
    ];

    let mut out = Vec::new();
    let mut date = start;
    let mut k = 0.0_f64;
    while date < end {
        for (class, maturity, level, amplitude) in maturities {
            let Some(maturity) = maturity else { continue };
            out.push(BondQuote {
                bond_class: class.to_string(),
                maturity,
                quote_date: date,
                bid_rate: level + amplitude * (0.08 * k).sin(),
            });
        }
        date += Duration::days(7);
        k += 1.0;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(quarters: usize) -> RawInputs {
        synthetic_inputs(
            Period::quarter(2019, 1).unwrap(),
            quarters,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn is_deterministic() {
        assert_eq!(inputs(12), inputs(12));
    }

    #[test]
    fn covers_requested_window() {
        let raw = inputs(12);
        assert_eq!(raw.official_gap.len(), 12);
        assert_eq!(raw.official_gap[0].quarter_label, "2019T1");
        assert_eq!(raw.official_gap[11].quarter_label, "2021T4");
        assert_eq!(raw.gdp.len(), 12 + GDP_LEAD_QUARTERS as usize);
        assert_eq!(raw.gdp[0].date, NaiveDate::from_ymd_opt(2015, 1, 1).unwrap());

        let last_quote = raw.bonds.iter().map(|b| b.quote_date).max().unwrap();
        assert!(last_quote < NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
        let last_survey = raw.surveys.iter().map(|s| s.observation_date).max().unwrap();
        assert_eq!(last_survey, NaiveDate::from_ymd_opt(2021, 12, 20).unwrap());
    }

    #[test]
    fn rejects_empty_window() {
        let res = synthetic_inputs(Period::quarter(2019, 1).unwrap(), 0, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(res.is_err());
    }
}

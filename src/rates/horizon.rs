//! Survey horizon selection.
//!
//! Annual Focus expectations are published for several reference years on
//! every observation date. A "t+n" expectation is the one whose reference year
//! is the observation year plus `n`.

use chrono::{Datelike, NaiveDate};
use log::debug;

use crate::domain::SurveyObservation;
use crate::error::PipelineError;

/// Reference-year token for an observation date `years_ahead` years out.
pub fn reference_year(date: NaiveDate, years_ahead: i32) -> String {
    (date.year() + years_ahead).to_string()
}

/// Reference-year tokens for `YYYY-MM-DD` date strings.
///
/// Each date is resolved independently; any unparseable date fails the call.
pub fn reference_years<S: AsRef<str>>(dates: &[S], years_ahead: i32) -> Result<Vec<String>, PipelineError> {
    dates
        .iter()
        .map(|raw| {
            let raw = raw.as_ref();
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(|d| reference_year(d, years_ahead))
                .map_err(|e| PipelineError::InvalidInput(format!("invalid observation date '{raw}': {e}")))
        })
        .collect()
}

/// `(observation_date, median)` pairs for one indicator at a fixed horizon.
pub fn select_horizon(
    rows: &[SurveyObservation],
    indicator: &str,
    calculation_basis: i32,
    years_ahead: i32,
) -> Vec<(NaiveDate, f64)> {
    let selected: Vec<(NaiveDate, f64)> = rows
        .iter()
        .filter(|r| r.indicator == indicator && r.calculation_basis == calculation_basis)
        .filter(|r| r.reference_year.trim() == reference_year(r.observation_date, years_ahead))
        .map(|r| (r.observation_date, r.median))
        .collect();

    debug!(
        "{indicator} t+{years_ahead}: {} of {} survey rows selected",
        selected.len(),
        rows.len()
    );
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: &str, indicator: &str, reference: &str, median: f64) -> SurveyObservation {
        SurveyObservation {
            observation_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            indicator: indicator.to_string(),
            reference_year: reference.to_string(),
            median,
            calculation_basis: 0,
        }
    }

    #[test]
    fn resolves_years_ahead() {
        assert_eq!(reference_years(&["2022-01-01"], 3).unwrap(), vec!["2025"]);
        assert_eq!(
            reference_years(&["2022-12-31", "1999-06-15"], 1).unwrap(),
            vec!["2023", "2000"]
        );
        assert_eq!(reference_years(&["2022-06-01"], -2).unwrap(), vec!["2020"]);
    }

    #[test]
    fn unparseable_date_fails() {
        let err = reference_years(&["2022-01-01", "not a date"], 1).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn selects_matching_horizon_indicator_and_basis() {
        let mut other_basis = row("2022-03-01", "IPCA", "2023", 9.0);
        other_basis.calculation_basis = 1;
        let rows = vec![
            row("2022-03-01", "IPCA", "2022", 6.0),
            row("2022-03-01", "IPCA", "2023", 4.0),
            row("2022-03-01", "IPCA", "2026", 3.0),
            row("2022-03-01", "Selic", "2023", 10.0),
            other_basis,
        ];

        let t1 = select_horizon(&rows, "IPCA", 0, 1);
        assert_eq!(t1.len(), 1);
        assert_eq!(t1[0].1, 4.0);

        let t4 = select_horizon(&rows, "IPCA", 0, 4);
        assert_eq!(t4.len(), 1);
        assert_eq!(t4[0].1, 3.0);
    }
}

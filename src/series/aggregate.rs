//! Calendar aggregation of irregular observations.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::{Frequency, Period, Series};
use crate::error::PipelineError;

/// Mean of all values per calendar period.
///
/// Periods without observations are absent from the result. Values are
/// summed in sorted order so the result does not depend on input row order.
pub fn mean_by_period(
    name: impl Into<String>,
    observations: impl IntoIterator<Item = (NaiveDate, f64)>,
    freq: Frequency,
) -> Result<Series, PipelineError> {
    let mut groups: BTreeMap<Period, Vec<f64>> = BTreeMap::new();
    for (date, value) in observations {
        groups.entry(Period::containing(date, freq)).or_default().push(value);
    }

    Series::from_points(
        name,
        freq,
        groups.into_iter().map(|(period, values)| (period, sorted_mean(values))),
    )
}

/// Re-aggregate a monthly series into quarterly means of its observed values.
pub fn monthly_to_quarterly(series: &Series) -> Result<Series, PipelineError> {
    if series.frequency() != Frequency::Monthly {
        return Err(PipelineError::InvalidInput(format!(
            "series '{}' is not monthly",
            series.name()
        )));
    }
    mean_by_period(
        series.name(),
        series.observed().map(|(p, v)| (p.start_date(), v)),
        Frequency::Quarterly,
    )
}

fn sorted_mean(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn quarterly_mean_of_one_quarter_is_simple_mean() {
        let obs = vec![
            (d("2023-01-02"), 10.0),
            (d("2023-02-15"), 11.0),
            (d("2023-03-31"), 15.0),
        ];
        let s = mean_by_period("x", obs, Frequency::Quarterly).unwrap();
        assert_eq!(s.len(), 1);
        assert_abs_diff_eq!(s.get(&Period::quarter(2023, 1).unwrap()).unwrap(), 12.0, epsilon = 1e-12);
    }

    #[test]
    fn shared_timestamps_are_all_counted_and_empty_periods_absent() {
        let obs = vec![
            (d("2023-01-05"), 1.0),
            (d("2023-01-05"), 3.0),
            (d("2023-03-10"), 7.0),
        ];
        let s = mean_by_period("x", obs, Frequency::Monthly).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.get(&Period::month(2023, 1).unwrap()), Some(2.0));
        assert_eq!(s.get(&Period::month(2023, 2).unwrap()), None);
        assert_eq!(s.get(&Period::month(2023, 3).unwrap()), Some(7.0));
    }

    #[test]
    fn monthly_rolls_up_to_quarters() {
        let obs = vec![(d("2023-01-05"), 1.0), (d("2023-02-05"), 2.0), (d("2023-04-05"), 9.0)];
        let monthly = mean_by_period("x", obs, Frequency::Monthly).unwrap();
        let quarterly = monthly_to_quarterly(&monthly).unwrap();
        assert_eq!(quarterly.get(&Period::quarter(2023, 1).unwrap()), Some(1.5));
        assert_eq!(quarterly.get(&Period::quarter(2023, 2).unwrap()), Some(9.0));
        assert!(monthly_to_quarterly(&quarterly).is_err());
    }

    proptest! {
        #[test]
        fn result_ignores_row_order(
            values in prop::collection::vec((0u32..365, -100.0..100.0_f64), 1..80),
            rotate in 0usize..80,
        ) {
            let base = d("2021-01-01");
            let rows: Vec<(NaiveDate, f64)> = values
                .iter()
                .map(|(day, v)| (base + chrono::Duration::days(i64::from(*day)), *v))
                .collect();
            let mut shuffled = rows.clone();
            shuffled.reverse();
            let k = rotate % shuffled.len();
            shuffled.rotate_left(k);

            let a = mean_by_period("x", rows, Frequency::Quarterly).unwrap();
            let b = mean_by_period("x", shuffled, Frequency::Quarterly).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}

//! Period-indexed numeric series.

use std::collections::BTreeMap;

use crate::domain::{Frequency, Period};
use crate::error::PipelineError;

/// An ordered `(period, value)` sequence with unique periods.
///
/// Values are optional: a period can be present in the index with no value
/// (e.g. the leading quarters of a Hamilton trend, where the lags are not
/// observable). Keeping those periods keeps alignment keyed on the period
/// rather than on position.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    name: String,
    freq: Frequency,
    points: BTreeMap<Period, Option<f64>>,
}

impl Series {
    pub fn new(name: impl Into<String>, freq: Frequency) -> Self {
        Self {
            name: name.into(),
            freq,
            points: BTreeMap::new(),
        }
    }

    /// Build a series from fully observed points.
    ///
    /// Fails on a frequency mismatch or a repeated period.
    pub fn from_points(
        name: impl Into<String>,
        freq: Frequency,
        points: impl IntoIterator<Item = (Period, f64)>,
    ) -> Result<Self, PipelineError> {
        let mut series = Self::new(name, freq);
        for (period, value) in points {
            series.insert(period, Some(value))?;
        }
        Ok(series)
    }

    pub fn insert(&mut self, period: Period, value: Option<f64>) -> Result<(), PipelineError> {
        if period.frequency() != self.freq {
            return Err(PipelineError::InvalidInput(format!(
                "period {period} does not match the {:?} frequency of series '{}'",
                self.freq, self.name
            )));
        }
        if self.points.insert(period, value).is_some() {
            return Err(PipelineError::InvalidInput(format!(
                "duplicate period {period} in series '{}'",
                self.name
            )));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn frequency(&self) -> Frequency {
        self.freq
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Value at `period`, `None` if the period is absent or missing.
    pub fn get(&self, period: &Period) -> Option<f64> {
        self.points.get(period).copied().flatten()
    }

    /// All periods in chronological order, including missing ones.
    pub fn iter(&self) -> impl Iterator<Item = (Period, Option<f64>)> + '_ {
        self.points.iter().map(|(p, v)| (*p, *v))
    }

    /// Observed `(period, value)` pairs in chronological order.
    pub fn observed(&self) -> impl Iterator<Item = (Period, f64)> + '_ {
        self.points.iter().filter_map(|(p, v)| v.map(|v| (*p, v)))
    }

    pub fn periods(&self) -> impl Iterator<Item = Period> + '_ {
        self.points.keys().copied()
    }

    pub fn first_period(&self) -> Option<Period> {
        self.points.keys().next().copied()
    }

    pub fn last_period(&self) -> Option<Period> {
        self.points.keys().next_back().copied()
    }

    /// Number of missing values before the first observed one.
    pub fn leading_missing(&self) -> usize {
        self.points.values().take_while(|v| v.is_none()).count()
    }

    /// Copy with missing periods removed.
    pub fn dropna(&self) -> Self {
        Self {
            name: self.name.clone(),
            freq: self.freq,
            points: self
                .points
                .iter()
                .filter(|(_, v)| v.is_some())
                .map(|(p, v)| (*p, *v))
                .collect(),
        }
    }

    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// True when there are no skipped periods between first and last.
    pub fn is_contiguous(&self) -> bool {
        self.points
            .keys()
            .zip(self.points.keys().skip(1))
            .all(|(a, b)| a.offset(1) == *b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(year: i32, quarter: u32) -> Period {
        Period::quarter(year, quarter).unwrap()
    }

    #[test]
    fn rejects_duplicates_and_mixed_frequencies() {
        let mut s = Series::new("x", Frequency::Quarterly);
        s.insert(q(2020, 1), Some(1.0)).unwrap();
        assert!(s.insert(q(2020, 1), Some(2.0)).is_err());
        assert!(s.insert(Period::month(2020, 1).unwrap(), Some(2.0)).is_err());
    }

    #[test]
    fn keeps_chronological_order_and_missing_values() {
        let mut s = Series::new("x", Frequency::Quarterly);
        s.insert(q(2020, 3), Some(3.0)).unwrap();
        s.insert(q(2020, 1), None).unwrap();
        s.insert(q(2020, 2), Some(2.0)).unwrap();

        let periods: Vec<_> = s.periods().collect();
        assert_eq!(periods, vec![q(2020, 1), q(2020, 2), q(2020, 3)]);
        assert_eq!(s.leading_missing(), 1);
        assert_eq!(s.dropna().len(), 2);
        assert_eq!(s.get(&q(2020, 1)), None);
        assert_eq!(s.get(&q(2020, 2)), Some(2.0));
    }

    #[test]
    fn contiguity_detects_gaps() {
        let s = Series::from_points("x", Frequency::Quarterly, [(q(2020, 1), 1.0), (q(2020, 2), 1.0)]).unwrap();
        assert!(s.is_contiguous());
        let s = Series::from_points("x", Frequency::Quarterly, [(q(2020, 1), 1.0), (q(2020, 4), 1.0)]).unwrap();
        assert!(!s.is_contiguous());
    }
}

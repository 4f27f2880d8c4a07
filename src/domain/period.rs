//! Calendar periods (months and quarters).
//!
//! Every derived series in the pipeline is keyed by a [`Period`]. Periods of
//! different frequencies never share a series, so the derived ordering only
//! has to be meaningful within one frequency.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Sampling frequency of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Monthly,
    Quarterly,
}

impl Frequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
        }
    }
}

/// A calendar month or quarter.
///
/// Fields are private so a `Period` is always valid (month in 1..=12,
/// quarter in 1..=4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    year: i32,
    sub: u32,
    freq: Frequency,
}

impl Period {
    pub fn month(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self {
            year,
            sub: month,
            freq: Frequency::Monthly,
        })
    }

    pub fn quarter(year: i32, quarter: u32) -> Option<Self> {
        (1..=4).contains(&quarter).then_some(Self {
            year,
            sub: quarter,
            freq: Frequency::Quarterly,
        })
    }

    /// The period of the given frequency that contains `date`.
    pub fn containing(date: NaiveDate, freq: Frequency) -> Self {
        let sub = match freq {
            Frequency::Monthly => date.month(),
            Frequency::Quarterly => (date.month() - 1) / 3 + 1,
        };
        Self {
            year: date.year(),
            sub,
            freq,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn frequency(&self) -> Frequency {
        self.freq
    }

    /// Month (1..=12) or quarter (1..=4) within the year.
    pub fn index_in_year(&self) -> u32 {
        self.sub
    }

    /// First calendar day of the period (the chart timestamp).
    pub fn start_date(&self) -> NaiveDate {
        let month = match self.freq {
            Frequency::Monthly => self.sub,
            Frequency::Quarterly => (self.sub - 1) * 3 + 1,
        };
        NaiveDate::from_ymd_opt(self.year, month, 1).unwrap_or_default()
    }

    /// The quarter this period falls in (identity for quarters).
    pub fn to_quarter(&self) -> Self {
        Self::containing(self.start_date(), Frequency::Quarterly)
    }

    /// Shift by `n` periods of the same frequency (negative = earlier).
    pub fn offset(&self, n: i64) -> Self {
        let per_year = i64::from(self.freq.periods_per_year());
        let ordinal = i64::from(self.year) * per_year + i64::from(self.sub - 1) + n;
        Self {
            year: ordinal.div_euclid(per_year) as i32,
            sub: ordinal.rem_euclid(per_year) as u32 + 1,
            freq: self.freq,
        }
    }

    /// Parse a quarter label as found in the official output-gap sheet.
    ///
    /// Accepted forms: `2023Q1`, `2023-Q1`, `2023 Q1`, `2023T1`, `1T2023`,
    /// `2023.1`, `2023:1`.
    pub fn parse_quarter(label: &str) -> Result<Self, PipelineError> {
        let cleaned: String = label
            .trim()
            .to_ascii_uppercase()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();

        let invalid = || PipelineError::InvalidInput(format!("unrecognized quarter label '{label}'"));

        let (year, quarter) = if let Some((q, y)) = cleaned.split_once('T').filter(|(q, _)| q.len() == 1) {
            (y, q)
        } else if let Some(pair) = cleaned
            .split_once('Q')
            .or_else(|| cleaned.split_once('T'))
            .or_else(|| cleaned.split_once('.'))
            .or_else(|| cleaned.split_once(':'))
        {
            pair
        } else {
            return Err(invalid());
        };

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let quarter: u32 = quarter.parse().map_err(|_| invalid())?;
        Self::quarter(year, quarter).ok_or_else(invalid)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.freq {
            Frequency::Monthly => write!(f, "{}-{:02}", self.year, self.sub),
            Frequency::Quarterly => write!(f, "{}Q{}", self.year, self.sub),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn containing_truncates_to_period_start() {
        let q = Period::containing(d("2023-05-17"), Frequency::Quarterly);
        assert_eq!(q, Period::quarter(2023, 2).unwrap());
        assert_eq!(q.start_date(), d("2023-04-01"));

        let m = Period::containing(d("2023-05-17"), Frequency::Monthly);
        assert_eq!(m.start_date(), d("2023-05-01"));
        assert_eq!(m.to_quarter(), q);
    }

    #[test]
    fn offset_crosses_year_boundaries() {
        let q = Period::quarter(2020, 1).unwrap();
        assert_eq!(q.offset(-1), Period::quarter(2019, 4).unwrap());
        assert_eq!(q.offset(-8), Period::quarter(2018, 1).unwrap());
        assert_eq!(q.offset(7), Period::quarter(2021, 4).unwrap());

        let m = Period::month(2020, 12).unwrap();
        assert_eq!(m.offset(1), Period::month(2021, 1).unwrap());
    }

    #[test]
    fn parses_quarter_label_variants() {
        let expected = Period::quarter(2021, 3).unwrap();
        for label in ["2021Q3", "2021-Q3", "2021 q3", "2021T3", "3T2021", "2021.3", "2021:3"] {
            assert_eq!(Period::parse_quarter(label).unwrap(), expected, "{label}");
        }
        assert!(Period::parse_quarter("2021Q5").is_err());
        assert!(Period::parse_quarter("Hiato").is_err());
    }

    #[test]
    fn display_labels() {
        assert_eq!(Period::quarter(2022, 4).unwrap().to_string(), "2022Q4");
        assert_eq!(Period::month(2022, 3).unwrap().to_string(), "2022-03");
    }
}

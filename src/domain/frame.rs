//! Wide tables and long-format chart frames.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Period, Series};
use crate::error::PipelineError;

/// A named column of a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub label: String,
    pub values: Vec<f64>,
}

/// Wide table: one row per period, one column per named proxy.
///
/// Tables only come out of inner joins, so every cell is observed.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    periods: Vec<Period>,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(periods: Vec<Period>, columns: Vec<Column>) -> Result<Self, PipelineError> {
        if let Some(bad) = columns.iter().find(|c| c.values.len() != periods.len()) {
            return Err(PipelineError::InvalidInput(format!(
                "column '{}' has {} values for {} periods",
                bad.label,
                bad.values.len(),
                periods.len()
            )));
        }
        Ok(Self { periods, columns })
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn column(&self, label: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.label == label)
    }

    /// Extract one column as a period-indexed series.
    pub fn series(&self, label: &str) -> Result<Series, PipelineError> {
        let column = self
            .column(label)
            .ok_or_else(|| PipelineError::InvalidInput(format!("no column '{label}' in table")))?;
        let freq = self
            .periods
            .first()
            .map(|p| p.frequency())
            .ok_or_else(|| PipelineError::InvalidInput("empty table".into()))?;
        Series::from_points(label, freq, self.periods.iter().copied().zip(column.values.iter().copied()))
    }

    /// Reshape into long format, column by column.
    pub fn melt(&self, title: impl Into<String>) -> ChartFrame {
        let mut rows = Vec::with_capacity(self.periods.len() * self.columns.len());
        for column in &self.columns {
            for (period, value) in self.periods.iter().zip(&column.values) {
                rows.push(ChartRow {
                    period: period.start_date(),
                    proxy: column.label.clone(),
                    value: *value,
                });
            }
        }
        ChartFrame {
            title: title.into(),
            rows,
        }
    }
}

/// One `(period, proxy, value)` row of a chart frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRow {
    pub period: NaiveDate,
    pub proxy: String,
    pub value: f64,
}

/// Long-format table consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartFrame {
    pub title: String,
    pub rows: Vec<ChartRow>,
}

impl ChartFrame {
    pub fn from_series(title: impl Into<String>, series: &Series) -> Self {
        let rows = series
            .observed()
            .map(|(p, value)| ChartRow {
                period: p.start_date(),
                proxy: series.name().to_string(),
                value,
            })
            .collect();
        Self {
            title: title.into(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct proxy labels in order of first appearance.
    pub fn labels(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !out.contains(&row.proxy.as_str()) {
                out.push(&row.proxy);
            }
        }
        out
    }

    /// Points of one proxy, in row order.
    pub fn points(&self, label: &str) -> Vec<(NaiveDate, f64)> {
        self.rows
            .iter()
            .filter(|r| r.proxy == label)
            .map(|r| (r.period, r.value))
            .collect()
    }

    /// Earliest and latest period in the frame.
    pub fn period_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.rows.iter().map(|r| r.period).min()?;
        let max = self.rows.iter().map(|r| r.period).max()?;
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(year: i32, quarter: u32) -> Period {
        Period::quarter(year, quarter).unwrap()
    }

    #[test]
    fn melt_is_column_major_with_quarter_start_dates() {
        let table = Table::new(
            vec![q(2020, 1), q(2020, 2)],
            vec![
                Column { label: "a".into(), values: vec![1.0, 2.0] },
                Column { label: "b".into(), values: vec![3.0, 4.0] },
            ],
        )
        .unwrap();

        let frame = table.melt("t");
        assert_eq!(frame.rows.len(), 4);
        assert_eq!(frame.labels(), vec!["a", "b"]);
        assert_eq!(frame.rows[1].period, NaiveDate::from_ymd_opt(2020, 4, 1).unwrap());
        assert_eq!(frame.rows[2].proxy, "b");
        assert_eq!(frame.points("b"), vec![
            (NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), 3.0),
            (NaiveDate::from_ymd_opt(2020, 4, 1).unwrap(), 4.0),
        ]);
    }

    #[test]
    fn rejects_ragged_columns() {
        let res = Table::new(vec![q(2020, 1)], vec![Column { label: "a".into(), values: vec![] }]);
        assert!(res.is_err());
    }
}

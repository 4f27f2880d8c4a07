//! Reporting utilities: per-proxy summaries and formatted terminal output.

use chrono::NaiveDate;

use crate::domain::ChartFrame;

pub mod format;

pub use format::*;

/// Descriptive statistics of one proxy line of a chart frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxySummary {
    pub label: String,
    pub n: usize,
    pub first: NaiveDate,
    pub last: NaiveDate,
    pub last_value: f64,
    pub min: f64,
    pub max: f64,
}

/// One summary per proxy, in the frame's label order.
pub fn summarize(frame: &ChartFrame) -> Vec<ProxySummary> {
    frame
        .labels()
        .into_iter()
        .filter_map(|label| {
            let mut points = frame.points(label);
            points.sort_by_key(|(d, _)| *d);
            let (first, _) = *points.first()?;
            let (last, last_value) = *points.last()?;
            let (min, max) = points
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| (lo.min(*v), hi.max(*v)));
            Some(ProxySummary {
                label: label.to_string(),
                n: points.len(),
                first,
                last,
                last_value,
                min,
                max,
            })
        })
        .collect()
}

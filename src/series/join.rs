//! Period-keyed inner joins.
//!
//! Sources report on different cadences, so every combination of series is an
//! inner join on the period key: a period survives only if every input has an
//! observed value for it. An empty join is an error, not an empty result.

use std::collections::BTreeSet;

use log::debug;

use crate::domain::{Column, Period, Series, Table};
use crate::error::PipelineError;

/// Inner-join series on period, one column per series (named after it).
pub fn inner_join(series: &[&Series]) -> Result<Table, PipelineError> {
    let Some(first) = series.first() else {
        return Err(PipelineError::InvalidInput("inner join of zero series".into()));
    };
    if let Some(other) = series.iter().find(|s| s.frequency() != first.frequency()) {
        return Err(PipelineError::InvalidInput(format!(
            "cannot join {:?} series '{}' with {:?} series '{}'",
            first.frequency(),
            first.name(),
            other.frequency(),
            other.name()
        )));
    }

    let mut common: BTreeSet<Period> = first.observed().map(|(p, _)| p).collect();
    for s in &series[1..] {
        let observed: BTreeSet<Period> = s.observed().map(|(p, _)| p).collect();
        common.retain(|p| observed.contains(p));
    }

    if common.is_empty() {
        let right = series[1..]
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(PipelineError::alignment(first.name(), right));
    }

    let periods: Vec<Period> = common.into_iter().collect();
    let columns = series
        .iter()
        .map(|s| Column {
            label: s.name().to_string(),
            values: periods.iter().filter_map(|p| s.get(p)).collect(),
        })
        .collect();

    debug!(
        "inner join of [{}]: {} common periods (inputs: {:?})",
        series.iter().map(|s| s.name()).collect::<Vec<_>>().join(", "),
        periods.len(),
        series.iter().map(|s| s.len()).collect::<Vec<_>>()
    );

    Table::new(periods, columns)
}

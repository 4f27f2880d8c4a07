//! Long-run real rates from inflation-linked bond quotes.

use chrono::Datelike;
use log::{debug, warn};

use crate::domain::{BondQuote, Frequency, Series};
use crate::error::PipelineError;
use crate::series::{inner_join, mean_by_period};

/// Quarterly mean bid rate of one bond class and maturity year.
pub fn quarterly_bid_rate(
    quotes: &[BondQuote],
    bond_class: &str,
    maturity_year: i32,
    name: &str,
) -> Result<Series, PipelineError> {
    let selected: Vec<_> = quotes
        .iter()
        .filter(|q| q.bond_class == bond_class && q.maturity.year() == maturity_year)
        .filter(|q| q.bid_rate.is_finite())
        .map(|q| (q.quote_date, q.bid_rate))
        .collect();

    if selected.is_empty() {
        warn!("no '{bond_class}' quotes maturing in {maturity_year}");
    } else {
        debug!("{name}: {} daily quotes", selected.len());
    }

    mean_by_period(name, selected, Frequency::Quarterly)
}

/// A bond-implied real rate net of a constant term premium.
#[derive(Debug, Clone)]
pub struct MarketRate {
    /// Mean spread of the bond rate over the neutral proxy on the joint sample.
    pub term_premium: f64,
    pub real_rate: Series,
}

/// Subtract the mean bond-minus-neutral spread from the bond rate.
///
/// The premium is one scalar for the whole joined sample; the output covers
/// only periods present in both inputs.
pub fn net_of_term_premium(
    bond_rate: &Series,
    neutral: &Series,
    name: impl Into<String>,
) -> Result<MarketRate, PipelineError> {
    let joined = inner_join(&[bond_rate, neutral])?;
    let bond = &joined.columns()[0].values;
    let base = &joined.columns()[1].values;

    if bond.is_empty() {
        return Err(PipelineError::Arithmetic("term premium over an empty sample".into()));
    }
    let term_premium = bond.iter().zip(base).map(|(b, r)| b - r).sum::<f64>() / bond.len() as f64;

    let real_rate = Series::from_points(
        name,
        bond_rate.frequency(),
        joined.periods().iter().copied().zip(bond.iter().map(|b| b - term_premium)),
    )?;

    Ok(MarketRate {
        term_premium,
        real_rate,
    })
}

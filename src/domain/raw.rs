//! Raw rows as returned by the data-source fetchers.
//!
//! These are immutable pipeline inputs. They derive `Serialize` so a whole
//! input bundle can be hashed into a cache key.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One Focus survey record (annual expectations endpoint).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyObservation {
    pub observation_date: NaiveDate,
    pub indicator: String,
    /// Calendar year the expectation refers to, as published (`"2025"`).
    pub reference_year: String,
    pub median: f64,
    pub calculation_basis: i32,
}

/// One quarterly GDP observation (date = first day of the quarter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GdpObservation {
    pub date: NaiveDate,
    pub value: f64,
}

/// One row of the official output-gap sheet after header extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapObservation {
    pub quarter_label: String,
    pub gap_pct: f64,
}

/// One daily Tesouro Direto quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BondQuote {
    pub bond_class: String,
    pub maturity: NaiveDate,
    pub quote_date: NaiveDate,
    pub bid_rate: f64,
}

/// Everything the pipeline needs for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInputs {
    /// Day the data was fetched. Only identifies the snapshot; the pipeline
    /// never reads the clock.
    pub fetched_on: NaiveDate,
    pub surveys: Vec<SurveyObservation>,
    pub gdp: Vec<GdpObservation>,
    pub official_gap: Vec<GapObservation>,
    pub bonds: Vec<BondQuote>,
}

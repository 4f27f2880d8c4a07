//! Pipeline configuration and output types.
//!
//! Kept lightweight and serializable so computed charts can be cached to
//! disk and reloaded without recomputing.

use serde::{Deserialize, Serialize};

use crate::domain::ChartFrame;

/// Smoothing parameter used for every HP filter on quarterly data.
pub const QUARTERLY_HP_LAMBDA: f64 = 1600.0;

/// Focus indicator names.
pub const INDICATOR_IPCA: &str = "IPCA";
pub const INDICATOR_SELIC: &str = "Selic";

/// Tesouro Direto class of inflation-linked bonds with semiannual coupons (NTN-B).
pub const NTNB_CLASS: &str = "Tesouro IPCA+ com Juros Semestrais";

/// Proxy labels shown in the charts.
pub mod labels {
    pub const FOCUS_T4: &str = "Selic real esperada em 4 anos (Focus)";
    pub const FOCUS_T1_HP: &str = "Selic real esperada em 1 ano, filtro HP (Focus)";
    pub const GAP_BCB: &str = "Hiato BCB";
    pub const GAP_HP: &str = "Hiato Filtro HP";
    pub const GAP_HAMILTON: &str = "Hiato Filtro de Hamilton";
    pub const NTNB_35: &str = "NTN-B 35";
    pub const NTNB_45: &str = "NTN-B 45";
    pub const NTNB_45_HP: &str = "NTN-B 45, filtro HP";

    pub const PROXY1: [&str; 2] = [FOCUS_T4, FOCUS_T1_HP];
    pub const PROXY2: [&str; 4] = [FOCUS_T4, GAP_BCB, GAP_HP, GAP_HAMILTON];
    pub const PROXY3: [&str; 2] = [NTNB_35, NTNB_45];
    pub const PROXY4: [&str; 1] = [NTNB_45_HP];
}

/// Fixed run parameters.
///
/// The structural decomposition coefficients are not run parameters; they
/// are constants in `rates::decompose`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub hp_lambda: f64,
    /// Years ahead for the short-horizon survey expectation.
    pub short_horizon_years: i32,
    /// Years ahead for the long-horizon survey expectation.
    pub long_horizon_years: i32,
    /// Focus `baseCalculo` flag to keep.
    pub calculation_basis: i32,
    pub bond_class: String,
    pub short_maturity_year: i32,
    pub long_maturity_year: i32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            hp_lambda: QUARTERLY_HP_LAMBDA,
            short_horizon_years: 1,
            long_horizon_years: 4,
            calculation_basis: 0,
            bond_class: NTNB_CLASS.to_string(),
            short_maturity_year: 2035,
            long_maturity_year: 2045,
        }
    }
}

/// The five chart frames produced by one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyCharts {
    /// Focus 4-year real rate and HP trend of the 1-year real rate.
    pub proxy1: ChartFrame,
    /// High-frequency neutral rates (baseline + three gap decompositions).
    pub proxy2_high: ChartFrame,
    /// Low-frequency neutral rates (HP trend of each high-frequency series).
    pub proxy2_low: ChartFrame,
    /// NTN-B real rates net of term premium.
    pub proxy3: ChartFrame,
    /// HP trend of the NTN-B 2045 bid rate.
    pub proxy4: ChartFrame,
}

impl ProxyCharts {
    /// Frames in display order with a short file-friendly key.
    pub fn frames(&self) -> [(&'static str, &ChartFrame); 5] {
        [
            ("proxy1", &self.proxy1),
            ("proxy2_high", &self.proxy2_high),
            ("proxy2_low", &self.proxy2_low),
            ("proxy3", &self.proxy3),
            ("proxy4", &self.proxy4),
        ]
    }
}

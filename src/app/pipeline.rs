//! Shared pipeline logic used by every `nr` command.
//!
//! raw inputs -> survey real rates -> output gaps -> decompositions ->
//! bond real rates -> five chart frames
//!
//! Every stage is a pure function of its inputs. Each of the five outputs
//! tags its failures with the stage and series that failed.

use log::info;

use crate::data::RawSource;
use crate::domain::{
    ChartFrame, Frequency, INDICATOR_IPCA, INDICATOR_SELIC, PipelineConfig, ProxyCharts, RawInputs, Series, Table,
    labels,
};
use crate::error::{PipelineError, StageContext};
use crate::math::hp_trend;
use crate::rates::{
    decompose, fisher_series, gdp_series, hamilton_output_gap, hp_output_gap, net_of_term_premium, official_gap,
    quarterly_bid_rate, select_horizon,
};
use crate::series::{inner_join, mean_by_period, monthly_to_quarterly};

pub const TITLE_PROXY1: &str = "Selic real esperada (Focus)";
pub const TITLE_PROXY2_HIGH: &str = "Taxas neutras de alta frequência extraídas de hiato e taxa real 4 anos à frente Focus";
pub const TITLE_PROXY2_LOW: &str = "Taxas neutras de baixa frequência extraídas de hiato e taxa real 4 anos à frente Focus";
pub const TITLE_PROXY3: &str = "Taxas reais NTN-B descontando o prêmio a termo";
pub const TITLE_PROXY4: &str = "Juro neutro brasileiro a partir da NTN-B 2045 com Filtro HP";

/// All computed outputs of a single run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RunOutput {
    pub charts: ProxyCharts,
    /// Term premium per NTN-B label, in percentage points.
    pub term_premia: Vec<(String, f64)>,
}

/// Load raw inputs from `source` and run the pipeline on them.
pub fn run_from_source(source: &dyn RawSource, config: &PipelineConfig) -> Result<RunOutput, PipelineError> {
    let inputs = source.load()?;
    run_pipeline(&inputs, config)
}

/// Derive the five proxy chart frames from one raw input bundle.
pub fn run_pipeline(inputs: &RawInputs, config: &PipelineConfig) -> Result<RunOutput, PipelineError> {
    let neutral_t1 = survey_real_rate(inputs, config, config.short_horizon_years, "neutral_t1")
        .at_stage("survey real rate", "t+1")?;
    let neutral_t4 = survey_real_rate(inputs, config, config.long_horizon_years, labels::FOCUS_T4)
        .at_stage("survey real rate", "t+4")?;

    let proxy1 = focus_proxies(&neutral_t4, &neutral_t1, config).at_stage("proxy1", labels::FOCUS_T1_HP)?;
    info!("proxy1: {} rows", proxy1.rows.len());

    let (proxy2_high, proxy2_low) = gap_proxies(inputs, &neutral_t4, config)?;
    info!("proxy2: {} high-frequency rows, {} low-frequency rows", proxy2_high.rows.len(), proxy2_low.rows.len());

    let bond_short = quarterly_bid_rate(&inputs.bonds, &config.bond_class, config.short_maturity_year, labels::NTNB_35)
        .at_stage("bond quotes", labels::NTNB_35)?;
    let bond_long = quarterly_bid_rate(&inputs.bonds, &config.bond_class, config.long_maturity_year, labels::NTNB_45)
        .at_stage("bond quotes", labels::NTNB_45)?;

    let (proxy3, term_premia) = market_proxies(&bond_short, &bond_long, &neutral_t4)?;
    info!("proxy3: {} rows", proxy3.rows.len());

    let proxy4 = hp_trend(&bond_long, config.hp_lambda)
        .map(|trend| ChartFrame::from_series(TITLE_PROXY4, &trend.renamed(labels::NTNB_45_HP)))
        .at_stage("proxy4", labels::NTNB_45_HP)?;
    info!("proxy4: {} rows", proxy4.rows.len());

    Ok(RunOutput {
        charts: ProxyCharts {
            proxy1,
            proxy2_high,
            proxy2_low,
            proxy3,
            proxy4,
        },
        term_premia,
    })
}

/// Quarterly real rate implied by the Focus Selic and IPCA medians
/// `years_ahead` years out.
///
/// Medians are averaged per month, paired on the month, converted with the
/// Fisher relation and then averaged per quarter.
pub fn survey_real_rate(
    inputs: &RawInputs,
    config: &PipelineConfig,
    years_ahead: i32,
    name: &str,
) -> Result<Series, PipelineError> {
    let monthly = |indicator: &str| {
        mean_by_period(
            format!("{indicator} t+{years_ahead}"),
            select_horizon(&inputs.surveys, indicator, config.calculation_basis, years_ahead),
            Frequency::Monthly,
        )
    };
    let ipca = monthly(INDICATOR_IPCA)?;
    let selic = monthly(INDICATOR_SELIC)?;

    let real_monthly = fisher_series(&selic, &ipca, name)?;
    monthly_to_quarterly(&real_monthly)
}

/// 4-year survey real rate next to the HP trend of the 1-year one.
fn focus_proxies(neutral_t4: &Series, neutral_t1: &Series, config: &PipelineConfig) -> Result<ChartFrame, PipelineError> {
    let t1_trend = hp_trend(neutral_t1, config.hp_lambda)?.renamed(labels::FOCUS_T1_HP);
    let table = inner_join(&[neutral_t4, &t1_trend])?;
    Ok(table.melt(TITLE_PROXY1))
}

/// High- and low-frequency neutral rates from the three output-gap variants.
fn gap_proxies(
    inputs: &RawInputs,
    neutral_t4: &Series,
    config: &PipelineConfig,
) -> Result<(ChartFrame, ChartFrame), PipelineError> {
    let gdp = gdp_series(&inputs.gdp, "gdp").at_stage("output gap", "gdp")?;

    let gap_bcb = official_gap(&inputs.official_gap, "gap_bcb").at_stage("output gap", labels::GAP_BCB)?;
    let gap_hp = hp_output_gap(&gdp, config.hp_lambda, "gap_hp").at_stage("output gap", labels::GAP_HP)?;
    let gap_hamilton = hamilton_output_gap(&gdp, "gap_hamilton").at_stage("output gap", labels::GAP_HAMILTON)?;

    let r_bcb = decompose(neutral_t4, &gap_bcb, labels::GAP_BCB).at_stage("decomposition", labels::GAP_BCB)?;
    let r_hp = decompose(neutral_t4, &gap_hp, labels::GAP_HP).at_stage("decomposition", labels::GAP_HP)?;
    let r_hamilton =
        decompose(neutral_t4, &gap_hamilton, labels::GAP_HAMILTON).at_stage("decomposition", labels::GAP_HAMILTON)?;

    let high = inner_join(&[neutral_t4, &r_bcb, &r_hp, &r_hamilton]).at_stage("proxy2", "high frequency")?;
    let low = smooth_columns(&high, config.hp_lambda).at_stage("proxy2", "low frequency")?;

    Ok((high.melt(TITLE_PROXY2_HIGH), low.melt(TITLE_PROXY2_LOW)))
}

/// HP trend of every column of a joined table, over the same periods.
fn smooth_columns(table: &Table, lambda: f64) -> Result<Table, PipelineError> {
    let trends = table
        .columns()
        .iter()
        .map(|c| table.series(&c.label).and_then(|s| hp_trend(&s, lambda)))
        .collect::<Result<Vec<_>, _>>()?;
    let refs: Vec<&Series> = trends.iter().collect();
    inner_join(&refs)
}

/// NTN-B real rates net of their own term premium.
fn market_proxies(
    bond_short: &Series,
    bond_long: &Series,
    neutral_t4: &Series,
) -> Result<(ChartFrame, Vec<(String, f64)>), PipelineError> {
    let short = net_of_term_premium(bond_short, neutral_t4, labels::NTNB_35).at_stage("term premium", labels::NTNB_35)?;
    let long = net_of_term_premium(bond_long, neutral_t4, labels::NTNB_45).at_stage("term premium", labels::NTNB_45)?;
    info!(
        "term premia: {} {:.3} p.p., {} {:.3} p.p.",
        labels::NTNB_35,
        short.term_premium,
        labels::NTNB_45,
        long.term_premium
    );

    let table = inner_join(&[&short.real_rate, &long.real_rate]).at_stage("proxy3", "NTN-B real rates")?;
    let premia = vec![
        (labels::NTNB_35.to_string(), short.term_premium),
        (labels::NTNB_45.to_string(), long.term_premium),
    ];
    Ok((table.melt(TITLE_PROXY3), premia))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic_inputs;
    use crate::domain::Period;
    use chrono::NaiveDate;

    fn inputs() -> RawInputs {
        synthetic_inputs(
            Period::quarter(2018, 1).unwrap(),
            16,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn survey_real_rate_ignores_other_calculation_basis() {
        let raw = inputs();
        let config = PipelineConfig::default();
        let t1 = survey_real_rate(&raw, &config, 1, "t1").unwrap();
        assert_eq!(t1.len(), 16);
        // basis-1 rows carry a 99% IPCA median; a leak would push real rates far negative
        assert!(t1.observed().all(|(_, v)| v > -10.0));
    }

    #[test]
    fn pipeline_is_idempotent() {
        let raw = inputs();
        let config = PipelineConfig::default();
        let a = run_pipeline(&raw, &config).unwrap();
        let b = run_pipeline(&raw, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn high_and_low_frequency_share_periods() {
        let out = run_pipeline(&inputs(), &PipelineConfig::default()).unwrap();
        let high = out.charts.proxy2_high.points(labels::GAP_BCB);
        let low = out.charts.proxy2_low.points(labels::GAP_BCB);
        assert_eq!(high.len(), low.len());
        assert!(high.iter().zip(&low).all(|(h, l)| h.0 == l.0));
        // first survey quarter has no lagged gap
        assert!(high.iter().all(|(d, _)| *d > NaiveDate::from_ymd_opt(2018, 1, 1).unwrap()));
    }

    #[test]
    fn missing_bonds_fail_with_stage_context() {
        let mut raw = inputs();
        raw.bonds.retain(|b| b.maturity.format("%Y").to_string() != "2045");

        let err = run_pipeline(&raw, &PipelineConfig::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains(labels::NTNB_45), "{msg}");
        assert!(matches!(err.root(), PipelineError::Alignment { .. }));
    }

    struct FailingSource;

    impl RawSource for FailingSource {
        fn load(&self) -> Result<RawInputs, PipelineError> {
            Err(PipelineError::fetch("Focus expectations", "HTTP 503 Service Unavailable"))
        }
    }

    #[test]
    fn source_failure_surfaces_as_fetch_error() {
        let err = run_from_source(&FailingSource, &PipelineConfig::default()).unwrap_err();
        assert!(
            matches!(&err, PipelineError::DataFetch { source_name, .. } if source_name == "Focus expectations"),
            "{err}"
        );
        assert!(err.to_string().contains("503"), "{err}");
    }
}

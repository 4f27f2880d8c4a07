//! Banco Central do Brasil sources: Focus annual expectations and SGS GDP.

use chrono::NaiveDate;
use log::{debug, warn};
use serde::Deserialize;

use crate::data::{DataClient, parse_br_date, parse_decimal};
use crate::domain::{GdpObservation, INDICATOR_IPCA, INDICATOR_SELIC, SurveyObservation};
use crate::error::PipelineError;

const FOCUS_SOURCE: &str = "Focus annual expectations";
const SGS_SOURCE: &str = "SGS GDP series";
const FOCUS_PAGE_LIMIT: &str = "1000000";

impl DataClient {
    /// IPCA and Selic annual expectations with calculation basis 0.
    pub fn fetch_surveys(&self) -> Result<Vec<SurveyObservation>, PipelineError> {
        let mut out = Vec::new();
        for indicator in [INDICATOR_IPCA, INDICATOR_SELIC] {
            let filter = format!("Indicador eq '{indicator}' and baseCalculo eq 0");
            let body = self.get_text(
                FOCUS_SOURCE,
                &self.config.focus_url,
                &[
                    ("$filter", filter.as_str()),
                    ("$select", "Indicador,Data,DataReferencia,Mediana,baseCalculo"),
                    ("$format", "json"),
                    ("$top", FOCUS_PAGE_LIMIT),
                ],
            )?;
            let rows = parse_focus_json(&body)?;
            debug!("{indicator}: {} Focus rows", rows.len());
            out.extend(rows);
        }
        Ok(out)
    }

    /// Quarterly GDP index (SGS 22109).
    pub fn fetch_gdp(&self) -> Result<Vec<GdpObservation>, PipelineError> {
        let body = self.get_text(SGS_SOURCE, &self.config.sgs_url, &[("formato", "json")])?;
        parse_sgs_json(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ODataResponse {
    value: Vec<FocusRecord>,
}

#[derive(Debug, Deserialize)]
struct FocusRecord {
    #[serde(rename = "Indicador")]
    indicator: String,
    #[serde(rename = "Data")]
    date: String,
    #[serde(rename = "DataReferencia")]
    reference_year: String,
    #[serde(rename = "Mediana")]
    median: Option<f64>,
    #[serde(rename = "baseCalculo")]
    calculation_basis: i32,
}

/// Parse an Olinda OData page into survey rows.
///
/// Records without a median are skipped; an unparseable date fails the fetch.
pub fn parse_focus_json(body: &str) -> Result<Vec<SurveyObservation>, PipelineError> {
    let resp: ODataResponse = serde_json::from_str(body)
        .map_err(|e| PipelineError::fetch(FOCUS_SOURCE, format!("failed to parse response: {e}")))?;

    let mut out = Vec::with_capacity(resp.value.len());
    let mut skipped = 0usize;
    for rec in resp.value {
        let Some(median) = rec.median.filter(|m| m.is_finite()) else {
            skipped += 1;
            continue;
        };
        let observation_date = NaiveDate::parse_from_str(rec.date.trim(), "%Y-%m-%d")
            .map_err(|e| PipelineError::fetch(FOCUS_SOURCE, format!("invalid date '{}': {e}", rec.date)))?;
        out.push(SurveyObservation {
            observation_date,
            indicator: rec.indicator,
            reference_year: rec.reference_year,
            median,
            calculation_basis: rec.calculation_basis,
        });
    }
    if skipped > 0 {
        warn!("{FOCUS_SOURCE}: skipped {skipped} records without a median");
    }
    Ok(out)
}

#[derive(Debug, Deserialize)]
struct SgsRecord {
    data: String,
    valor: String,
}

/// Parse an SGS JSON payload (`[{"data":"01/01/1996","valor":"97.3"}]`).
pub fn parse_sgs_json(body: &str) -> Result<Vec<GdpObservation>, PipelineError> {
    let records: Vec<SgsRecord> = serde_json::from_str(body)
        .map_err(|e| PipelineError::fetch(SGS_SOURCE, format!("failed to parse response: {e}")))?;

    let mut out = Vec::with_capacity(records.len());
    for rec in records {
        let date = parse_br_date(&rec.data)
            .ok_or_else(|| PipelineError::fetch(SGS_SOURCE, format!("invalid date '{}'", rec.data)))?;
        match parse_decimal(&rec.valor) {
            Some(value) => out.push(GdpObservation { date, value }),
            None => warn!("{SGS_SOURCE}: skipping {} with value '{}'", rec.data, rec.valor),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_focus_page() {
        let body = r#"{"@odata.context":"x","value":[
            {"Indicador":"IPCA","Data":"2023-01-06","DataReferencia":"2024","Mediana":4.0,"baseCalculo":0},
            {"Indicador":"IPCA","Data":"2023-01-06","DataReferencia":"2027","Mediana":null,"baseCalculo":0}
        ]}"#;
        let rows = parse_focus_json(body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].reference_year, "2024");
        assert_eq!(rows[0].observation_date, NaiveDate::from_ymd_opt(2023, 1, 6).unwrap());
    }

    #[test]
    fn malformed_focus_page_is_a_fetch_error() {
        let err = parse_focus_json("<html>busy</html>").unwrap_err();
        assert!(matches!(err, PipelineError::DataFetch { .. }));
    }

    #[test]
    fn parses_sgs_payload() {
        let body = r#"[{"data":"01/01/1996","valor":"97.31"},{"data":"01/04/1996","valor":""}]"#;
        let rows = parse_sgs_json(body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(1996, 1, 1).unwrap());
        assert_eq!(rows[0].value, 97.31);
    }
}

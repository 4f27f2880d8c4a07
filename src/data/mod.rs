//! Raw data sources.
//!
//! - BCB Focus survey and SGS GDP series (`bcb`)
//! - Tesouro Direto price/rate file (`tesouro`)
//! - official output-gap sheet, from the Inflation Report workbook or a CSV
//!   extraction of it (`gap_sheet`)
//! - deterministic synthetic inputs for offline runs and tests (`sample`)
//!
//! Fetchers only turn remote/raw data into [`RawInputs`]; no derivation
//! happens here.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use csv::StringRecord;
use log::info;
use reqwest::blocking::{Client, Response};
use serde::Serialize;

use crate::domain::{GapObservation, RawInputs};
use crate::error::PipelineError;

pub mod bcb;
pub mod gap_sheet;
pub mod sample;
pub mod tesouro;

pub use sample::{SyntheticSource, synthetic_inputs};

pub const DEFAULT_FOCUS_URL: &str =
    "https://olinda.bcb.gov.br/olinda/servico/Expectativas/versao/v1/odata/ExpectativasMercadoAnuais";
pub const DEFAULT_SGS_URL: &str = "https://api.bcb.gov.br/dados/serie/bcdata.sgs.22109/dados";
pub const DEFAULT_TESOURO_URL: &str = "https://www.tesourotransparente.gov.br/ckan/dataset/df56aa42-484a-4a59-8184-7676580c81e3/resource/796d2059-14e9-44e3-80c9-2d9e30b405c1/download/PrecoTaxaTesouroDireto.csv";
pub const DEFAULT_GAP_URL: &str = "https://www.bcb.gov.br/content/ri/relatorioinflacao/202306/ri202306anp.xlsx";
pub const DEFAULT_GAP_SHEET: &str = "Graf 2.2.4";
pub const DEFAULT_GAP_SKIP_ROWS: usize = 8;

/// Anything that can produce a full raw input bundle.
pub trait RawSource {
    fn load(&self) -> Result<RawInputs, PipelineError>;
}

/// Where to fetch each raw table from.
///
/// Serializable so a live run can be cached under a digest of its settings.
#[derive(Debug, Clone, Serialize)]
pub struct SourceConfig {
    pub focus_url: String,
    pub sgs_url: String,
    pub tesouro_url: String,
    /// Inflation Report workbook: an http(s) URL or a local `.xlsx` path.
    pub gap_url: String,
    /// Worksheet holding the output-gap chart data.
    pub gap_sheet: String,
    /// CSV extraction of the gap sheet; replaces the workbook when set.
    pub gap_csv: Option<PathBuf>,
    /// Leading rows (titles, notes) above the header row of the gap sheet.
    pub gap_skip_rows: usize,
    pub fetched_on: NaiveDate,
}

/// Live HTTP fetcher for all four sources.
pub struct DataClient {
    client: Client,
    config: SourceConfig,
}

impl DataClient {
    pub fn new(config: SourceConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn send(&self, source_name: &str, url: &str, query: &[(&str, &str)]) -> Result<Response, PipelineError> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| PipelineError::fetch(source_name, format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(PipelineError::fetch(
                source_name,
                format!("request failed with status {}", resp.status()),
            ));
        }
        Ok(resp)
    }

    pub(crate) fn get_text(&self, source_name: &str, url: &str, query: &[(&str, &str)]) -> Result<String, PipelineError> {
        self.send(source_name, url, query)?
            .text()
            .map_err(|e| PipelineError::fetch(source_name, format!("failed to read body: {e}")))
    }

    pub(crate) fn get_bytes(&self, source_name: &str, url: &str) -> Result<Vec<u8>, PipelineError> {
        self.send(source_name, url, &[])?
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| PipelineError::fetch(source_name, format!("failed to read body: {e}")))
    }

    /// Official output gap from the CSV extraction if configured, else from
    /// the workbook.
    pub fn fetch_official_gap(&self) -> Result<Vec<GapObservation>, PipelineError> {
        let cfg = &self.config;
        if let Some(path) = &cfg.gap_csv {
            return gap_sheet::load_official_gap_csv(path, cfg.gap_skip_rows);
        }
        let workbook = if cfg.gap_url.starts_with("http://") || cfg.gap_url.starts_with("https://") {
            self.get_bytes(gap_sheet::GAP_SOURCE, &cfg.gap_url)?
        } else {
            gap_sheet::read_local(std::path::Path::new(&cfg.gap_url))?
        };
        gap_sheet::parse_gap_xlsx(&workbook, &cfg.gap_sheet, cfg.gap_skip_rows)
    }
}

impl RawSource for DataClient {
    fn load(&self) -> Result<RawInputs, PipelineError> {
        // Local gap files fail fast, before any network round trip.
        let official_gap = self.fetch_official_gap()?;
        let surveys = self.fetch_surveys()?;
        let gdp = self.fetch_gdp()?;
        let bonds = self.fetch_bond_quotes()?;

        info!(
            "fetched {} survey rows, {} GDP quarters, {} gap quarters, {} bond quotes",
            surveys.len(),
            gdp.len(),
            official_gap.len(),
            bonds.len()
        );

        Ok(RawInputs {
            fetched_on: self.config.fetched_on,
            surveys,
            gdp,
            official_gap,
            bonds,
        })
    }
}

pub(crate) fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

pub(crate) fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often carry a UTF-8 BOM on the first header.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_lowercase()
}

/// Parse a number that may use a decimal comma (`5,42`).
pub(crate) fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return None;
    }
    let v = trimmed.replace(',', ".").parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Parse a day-first Brazilian date (`15/05/2035`), also accepting ISO dates.
pub(crate) fn parse_br_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
        .ok()
}

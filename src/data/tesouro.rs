//! Tesouro Direto historical prices and rates.
//!
//! The published file is `;` separated with decimal commas and day-first
//! dates. Only four columns are used.

use log::{debug, warn};

use crate::data::{DataClient, build_header_map, parse_br_date, parse_decimal};
use crate::domain::BondQuote;
use crate::error::PipelineError;

const TESOURO_SOURCE: &str = "Tesouro Direto rates";

const COL_CLASS: &str = "tipo titulo";
const COL_MATURITY: &str = "data vencimento";
const COL_DATE: &str = "data base";
const COL_BID: &str = "taxa compra manha";

impl DataClient {
    pub fn fetch_bond_quotes(&self) -> Result<Vec<BondQuote>, PipelineError> {
        let body = self.get_text(TESOURO_SOURCE, &self.config.tesouro_url, &[])?;
        parse_tesouro_csv(&body)
    }
}

/// Parse the Tesouro Direto CSV into quotes.
///
/// Rows with unparseable fields are skipped and counted; missing columns fail.
pub fn parse_tesouro_csv(body: &str) -> Result<Vec<BondQuote>, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::fetch(TESOURO_SOURCE, format!("failed to read headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let column = |name: &str| {
        header_map
            .get(name)
            .copied()
            .ok_or_else(|| PipelineError::fetch(TESOURO_SOURCE, format!("missing column '{name}'")))
    };
    let (i_class, i_maturity, i_date, i_bid) =
        (column(COL_CLASS)?, column(COL_MATURITY)?, column(COL_DATE)?, column(COL_BID)?);

    let mut out = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let Ok(record) = record else {
            skipped += 1;
            continue;
        };
        let field = |i: usize| record.get(i).unwrap_or("");

        let quote = (|| {
            Some(BondQuote {
                bond_class: field(i_class).to_string(),
                maturity: parse_br_date(field(i_maturity))?,
                quote_date: parse_br_date(field(i_date))?,
                bid_rate: parse_decimal(field(i_bid))?,
            })
        })();

        match quote {
            Some(q) => out.push(q),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("{TESOURO_SOURCE}: skipped {skipped} malformed rows");
    }
    debug!("{TESOURO_SOURCE}: {} quotes parsed", out.len());
    Ok(out)
}

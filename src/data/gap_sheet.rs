//! Official output gap from the Inflation Report chart data.
//!
//! The workbook sheet (`Graf 2.2.4` in the published file) has title and
//! notes rows above the header, a quarter label column (`Trimestre`) and a
//! gap column (`Hiato`). The same layout is accepted as a CSV extraction.
//! Which sheet and how many rows to skip are properties of the published
//! file, so both are caller inputs.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use chrono::NaiveDate;
use log::{debug, warn};

use crate::data::{normalize_header_name, parse_decimal};
use crate::domain::{Frequency, GapObservation, Period};
use crate::error::PipelineError;

pub(crate) const GAP_SOURCE: &str = "official output gap";

const COL_QUARTER: &str = "trimestre";
const COL_GAP: &str = "hiato";

/// One sheet cell, reduced to what the gap table needs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

impl Cell {
    fn text(&self) -> String {
        match self {
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(v) => v.to_string(),
            Cell::Date(d) => Period::containing(*d, Frequency::Quarterly).to_string(),
            Cell::Empty => String::new(),
        }
    }

    fn number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if v.is_finite() => Some(*v),
            Cell::Text(s) => parse_decimal(s),
            _ => None,
        }
    }
}

pub(crate) fn read_local(path: &Path) -> Result<Vec<u8>, PipelineError> {
    fs::read(path).map_err(|e| PipelineError::fetch(GAP_SOURCE, format!("failed to read '{}': {e}", path.display())))
}

pub fn load_official_gap_csv(path: &Path, skip_rows: usize) -> Result<Vec<GapObservation>, PipelineError> {
    let body = fs::read_to_string(path)
        .map_err(|e| PipelineError::fetch(GAP_SOURCE, format!("failed to read '{}': {e}", path.display())))?;
    parse_gap_csv(&body, skip_rows)
}

/// Parse workbook bytes, reading `sheet` after skipping `skip_rows` sheet rows.
pub fn parse_gap_xlsx(bytes: &[u8], sheet: &str, skip_rows: usize) -> Result<Vec<GapObservation>, PipelineError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| PipelineError::fetch(GAP_SOURCE, format!("failed to open workbook: {e}")))?;
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| PipelineError::fetch(GAP_SOURCE, format!("failed to read sheet '{sheet}': {e}")))?;

    // The range starts at the first used cell, not at A1.
    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    let rows = range.rows().map(|row| row.iter().map(cell_from_data).collect::<Vec<Cell>>());
    gap_rows(rows, skip_rows.saturating_sub(first_row))
}

/// Parse the CSV extraction after skipping `skip_rows` leading lines.
///
/// The delimiter is `;` when the header line contains one, `,` otherwise.
pub fn parse_gap_csv(body: &str, skip_rows: usize) -> Result<Vec<GapObservation>, PipelineError> {
    let table: String = body.lines().skip(skip_rows).collect::<Vec<_>>().join("\n");
    let header_line = table.lines().next().unwrap_or("");
    let delimiter = if header_line.contains(';') { b';' } else { b',' };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(table.as_bytes());

    let rows = reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(|f| Cell::Text(f.to_string())).collect())
                .map_err(|e| PipelineError::fetch(GAP_SOURCE, format!("CSV parse error: {e}")))
        })
        .collect::<Result<Vec<Vec<Cell>>, _>>()?;
    gap_rows(rows, 0)
}

pub(crate) fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(v) => Cell::Number(*v),
        Data::Int(v) => Cell::Number(*v as f64),
        Data::DateTime(dt) => dt.as_datetime().map_or(Cell::Empty, |d| Cell::Date(d.date())),
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map_or_else(|| Cell::Text(s.clone()), Cell::Date),
        _ => Cell::Empty,
    }
}

/// Header lookup and row extraction shared by both file formats.
fn gap_rows(rows: impl IntoIterator<Item = Vec<Cell>>, skip_rows: usize) -> Result<Vec<GapObservation>, PipelineError> {
    let mut rows = rows.into_iter().skip(skip_rows);
    let header = rows
        .next()
        .ok_or_else(|| PipelineError::fetch(GAP_SOURCE, format!("no header row after skipping {skip_rows} rows")))?;

    let position = |name: &str| header.iter().position(|c| normalize_header_name(&c.text()) == name);
    let (Some(i_quarter), Some(i_gap)) = (position(COL_QUARTER), position(COL_GAP)) else {
        return Err(PipelineError::fetch(
            GAP_SOURCE,
            format!("expected '{COL_QUARTER}' and '{COL_GAP}' columns after skipping {skip_rows} rows"),
        ));
    };

    let mut out = Vec::new();
    for row in rows {
        let label = row.get(i_quarter).map(Cell::text).unwrap_or_default();
        if label.is_empty() {
            // trailing notes / blank lines below the table
            continue;
        }
        match row.get(i_gap).and_then(Cell::number) {
            Some(gap_pct) => out.push(GapObservation {
                quarter_label: label,
                gap_pct,
            }),
            None => warn!("{GAP_SOURCE}: no value for '{label}'"),
        }
    }
    debug!("{GAP_SOURCE}: {} quarters read", out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_title_rows_and_reads_decimal_commas() {
        let body = "Gráfico 2.2.4 - Hiato do produto\n\
                    Fonte: BCB\n\
                    \n\
                    Trimestre;Hiato\n\
                    2022T4;-0,35\n\
                    2023T1;0,10\n\
                    ;\n";
        let rows = parse_gap_csv(body, 3).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].quarter_label, "2022T4");
        assert_eq!(rows[0].gap_pct, -0.35);
    }

    #[test]
    fn wrong_skip_count_is_a_fetch_error() {
        let body = "title\nTrimestre,Hiato\n2023Q1,0.5\n";
        assert!(parse_gap_csv(body, 0).is_err());
        assert_eq!(parse_gap_csv(body, 1).unwrap().len(), 1);
    }

    #[test]
    fn sheet_cells_accept_dates_numbers_and_text() {
        let rows = vec![
            vec![Cell::Text("Hiato do produto".into()), Cell::Empty],
            vec![Cell::Empty, Cell::Empty],
            vec![Cell::Text(" Trimestre ".into()), Cell::Text("Hiato".into())],
            vec![Cell::Date(NaiveDate::from_ymd_opt(2022, 10, 1).unwrap()), Cell::Number(-0.4)],
            vec![Cell::Text("2023.1".into()), Cell::Text("0,25".into())],
            vec![Cell::Number(2023.2), Cell::Number(0.5)],
            vec![Cell::Text("Fonte: BCB".into()), Cell::Empty],
        ];
        let gap = gap_rows(rows, 2).unwrap();
        let labels: Vec<&str> = gap.iter().map(|g| g.quarter_label.as_str()).collect();
        assert_eq!(labels, vec!["2022Q4", "2023.1", "2023.2"]);
        assert_eq!(gap[1].gap_pct, 0.25);
        for g in &gap {
            assert!(Period::parse_quarter(&g.quarter_label).is_ok(), "{}", g.quarter_label);
        }
    }

    #[test]
    fn workbook_cells_map_to_sheet_cells() {
        assert_eq!(cell_from_data(&Data::Float(1.5)), Cell::Number(1.5));
        assert_eq!(cell_from_data(&Data::Int(3)), Cell::Number(3.0));
        assert_eq!(cell_from_data(&Data::String("Hiato".into())), Cell::Text("Hiato".into()));
        assert_eq!(
            cell_from_data(&Data::DateTimeIso("2023-04-01T00:00:00".into())),
            Cell::Date(NaiveDate::from_ymd_opt(2023, 4, 1).unwrap())
        );
        assert_eq!(cell_from_data(&Data::Empty), Cell::Empty);
    }

    #[test]
    fn invalid_workbook_is_a_fetch_error() {
        let err = parse_gap_xlsx(b"not a zip archive", "Graf 2.2.4", 8).unwrap_err();
        assert!(matches!(err, PipelineError::DataFetch { .. }), "{err}");
    }
}

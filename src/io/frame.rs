//! Read a chart frame CSV back.

use std::path::Path;

use crate::domain::{ChartFrame, ChartRow};
use crate::error::AppError;

/// Load a `period,proxy,value` CSV as a chart frame titled `title`.
pub fn read_frame_csv(path: &Path, title: impl Into<String>) -> Result<ChartFrame, AppError> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to open frame CSV '{}': {e}", path.display())))?;

    let rows = reader
        .deserialize::<ChartRow>()
        .enumerate()
        .map(|(i, row)| row.map_err(|e| AppError::new(2, format!("Invalid frame CSV row {}: {e}", i + 1))))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ChartFrame {
        title: title.into(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::write_frame_csv;
    use chrono::NaiveDate;

    #[test]
    fn frame_csv_reloads_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proxy4.csv");

        let frame = ChartFrame {
            title: "t".into(),
            rows: vec![
                ChartRow {
                    period: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                    proxy: "NTN-B 45, filtro HP".into(),
                    value: 5.25,
                },
                ChartRow {
                    period: NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
                    proxy: "NTN-B 45, filtro HP".into(),
                    value: 5.5,
                },
            ],
        };
        write_frame_csv(&path, &frame).unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.starts_with("period,proxy,value\n2023-01-01,\"NTN-B 45, filtro HP\",5.25"), "{body}");

        let back = read_frame_csv(&path, "t").unwrap();
        assert_eq!(back, frame);
    }

    #[test]
    fn malformed_row_names_its_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "period,proxy,value\n2023-01-01,a,1.0\nnot-a-date,a,2.0\n").unwrap();

        let err = read_frame_csv(&path, "bad").unwrap_err();
        assert!(err.to_string().contains("row 2"), "{err}");
    }
}

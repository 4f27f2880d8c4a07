//! Export chart frames to CSV and JSON.
//!
//! One CSV per frame (`period,proxy,value`, long format) so spreadsheets and
//! `nr plot` can consume them, plus a single JSON bundle with every frame and
//! the term premia.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::app::pipeline::RunOutput;
use crate::domain::ChartFrame;
use crate::error::AppError;

pub const BUNDLE_FILE: &str = "proxies.json";

/// Write one chart frame as CSV.
pub fn write_frame_csv(path: &Path, frame: &ChartFrame) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    for row in &frame.rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV '{}': {e}", path.display())))?;
    Ok(())
}

/// Write every frame (`<name>.csv`) and the JSON bundle into `dir`.
///
/// Returns the written paths in output order, bundle last.
pub fn write_run_exports(dir: &Path, run: &RunOutput) -> Result<Vec<PathBuf>, AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create export dir '{}': {e}", dir.display())))?;

    let mut written = Vec::new();
    for (name, frame) in run.charts.frames() {
        let path = dir.join(format!("{name}.csv"));
        write_frame_csv(&path, frame)?;
        written.push(path);
    }

    let bundle = dir.join(BUNDLE_FILE);
    let file = File::create(&bundle)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", bundle.display())))?;
    serde_json::to_writer_pretty(file, run)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;
    written.push(bundle);

    Ok(written)
}

/// Read a JSON bundle written by [`write_run_exports`].
pub fn read_run_bundle(path: &Path) -> Result<RunOutput, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open export JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid export JSON: {e}")))
}

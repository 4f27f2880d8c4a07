//! Caller-controlled cache of pipeline runs.
//!
//! Entries are keyed either by the fetch date plus a digest of the source
//! settings (lets a live run skip the network on a second invocation the same
//! day with the same sources) or by a digest of the raw inputs. Nothing
//! expires on its own: callers invalidate explicitly.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Serialize;

use crate::app::pipeline::RunOutput;
use crate::data::SourceConfig;
use crate::domain::RawInputs;
use crate::error::{AppError, PipelineError};

const ENTRY_EXT: &str = "json";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Fetch date plus a blake3 digest of every source setting, so a change
    /// of endpoint or gap sheet never hits an entry computed from other data.
    pub fn for_fetch(config: &SourceConfig) -> Result<Self, PipelineError> {
        Ok(Self(format!(
            "fetch-{}-{}",
            config.fetched_on.format("%Y-%m-%d"),
            digest("source settings", config)?
        )))
    }

    /// Fetch date plus a blake3 digest of the serialized bundle.
    pub fn for_inputs(inputs: &RawInputs) -> Result<Self, PipelineError> {
        Ok(Self(format!(
            "inputs-{}-{}",
            inputs.fetched_on.format("%Y-%m-%d"),
            digest("raw inputs", inputs)?
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn digest<T: Serialize>(what: &str, value: &T) -> Result<String, PipelineError> {
    let bytes =
        serde_json::to_vec(value).map_err(|e| PipelineError::InvalidInput(format!("{what} are not serializable: {e}")))?;
    Ok(blake3::hash(&bytes).to_hex().as_str()[..16].to_string())
}

/// Run outputs by key, optionally mirrored to JSON files in a directory.
#[derive(Debug, Default)]
pub struct PipelineCache {
    dir: Option<PathBuf>,
    entries: HashMap<CacheKey, RunOutput>,
}

impl PipelineCache {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn persistent(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::new(2, format!("Failed to create cache dir '{}': {e}", dir.display())))?;
        Ok(Self {
            dir: Some(dir),
            entries: HashMap::new(),
        })
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Look up `key` in memory, then on disk.
    ///
    /// An unreadable or corrupt file counts as a miss.
    pub fn get(&mut self, key: &CacheKey) -> Option<RunOutput> {
        if let Some(hit) = self.entries.get(key) {
            return Some(hit.clone());
        }
        let path = self.entry_path(key)?;
        if !path.exists() {
            return None;
        }
        let loaded = fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|body| serde_json::from_str::<RunOutput>(&body).map_err(|e| e.to_string()));
        match loaded {
            Ok(out) => {
                debug!("cache hit on disk: {}", key.as_str());
                self.entries.insert(key.clone(), out.clone());
                Some(out)
            }
            Err(e) => {
                warn!("ignoring unreadable cache entry '{}': {e}", path.display());
                None
            }
        }
    }

    pub fn insert(&mut self, key: CacheKey, output: RunOutput) -> Result<(), AppError> {
        if let Some(path) = self.entry_path(&key) {
            write_atomic(&path, &output)?;
        }
        self.entries.insert(key, output);
        Ok(())
    }

    pub fn get_or_try_insert_with<F>(&mut self, key: CacheKey, compute: F) -> Result<RunOutput, AppError>
    where
        F: FnOnce() -> Result<RunOutput, AppError>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let output = compute()?;
        self.insert(key, output.clone())?;
        Ok(output)
    }

    /// Drop one entry. Returns whether anything was removed.
    pub fn invalidate(&mut self, key: &CacheKey) -> Result<bool, AppError> {
        let mut removed = self.entries.remove(key).is_some();
        if let Some(path) = self.entry_path(key).filter(|p| p.exists()) {
            fs::remove_file(&path)
                .map_err(|e| AppError::new(4, format!("Failed to remove cache entry '{}': {e}", path.display())))?;
            removed = true;
        }
        Ok(removed)
    }

    /// Drop every entry, in memory and on disk.
    pub fn clear(&mut self) -> Result<(), AppError> {
        self.entries.clear();
        let Some(dir) = &self.dir else {
            return Ok(());
        };
        let listing = fs::read_dir(dir)
            .map_err(|e| AppError::new(4, format!("Failed to list cache dir '{}': {e}", dir.display())))?;
        for entry in listing.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == ENTRY_EXT) {
                fs::remove_file(&path)
                    .map_err(|e| AppError::new(4, format!("Failed to remove cache entry '{}': {e}", path.display())))?;
            }
        }
        Ok(())
    }

    fn entry_path(&self, key: &CacheKey) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.{ENTRY_EXT}", key.as_str())))
    }
}

fn write_atomic(path: &Path, output: &RunOutput) -> Result<(), AppError> {
    let tmp = path.with_extension("tmp");
    let body = serde_json::to_vec(output).map_err(|e| AppError::new(4, format!("Failed to encode cache entry: {e}")))?;
    fs::write(&tmp, body)
        .map_err(|e| AppError::new(4, format!("Failed to write cache entry '{}': {e}", tmp.display())))?;
    fs::rename(&tmp, path)
        .map_err(|e| AppError::new(4, format!("Failed to move cache entry into '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::data::{DEFAULT_GAP_SHEET, DEFAULT_GAP_URL, synthetic_inputs};
    use crate::domain::{ChartFrame, Period, ProxyCharts};

    fn empty_output(tag: &str) -> RunOutput {
        let frame = || ChartFrame {
            title: tag.to_string(),
            rows: Vec::new(),
        };
        RunOutput {
            charts: ProxyCharts {
                proxy1: frame(),
                proxy2_high: frame(),
                proxy2_low: frame(),
                proxy3: frame(),
                proxy4: frame(),
            },
            term_premia: vec![("NTN-B 35".into(), 0.5)],
        }
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sources(gap_csv: Option<&str>) -> SourceConfig {
        SourceConfig {
            focus_url: "https://example.org/focus".into(),
            sgs_url: "https://example.org/sgs".into(),
            tesouro_url: "https://example.org/tesouro".into(),
            gap_url: DEFAULT_GAP_URL.into(),
            gap_sheet: DEFAULT_GAP_SHEET.into(),
            gap_csv: gap_csv.map(PathBuf::from),
            gap_skip_rows: 8,
            fetched_on: d("2024-05-02"),
        }
    }

    fn fetch_key() -> CacheKey {
        CacheKey::for_fetch(&sources(None)).unwrap()
    }

    #[test]
    fn input_key_tracks_content() {
        let a = synthetic_inputs(Period::quarter(2019, 1).unwrap(), 8, d("2024-01-01")).unwrap();
        let mut b = a.clone();
        assert_eq!(CacheKey::for_inputs(&a).unwrap(), CacheKey::for_inputs(&b).unwrap());

        b.bonds[0].bid_rate += 0.01;
        assert_ne!(CacheKey::for_inputs(&a).unwrap(), CacheKey::for_inputs(&b).unwrap());
    }

    #[test]
    fn fetch_key_tracks_source_settings() {
        let base = sources(None);
        assert_eq!(CacheKey::for_fetch(&base).unwrap(), CacheKey::for_fetch(&sources(None)).unwrap());
        assert!(fetch_key().as_str().starts_with("fetch-2024-05-02-"));

        let other_gap = sources(Some("gap_2024.csv"));
        assert_ne!(CacheKey::for_fetch(&base).unwrap(), CacheKey::for_fetch(&other_gap).unwrap());

        let mut other_skip = base.clone();
        other_skip.gap_skip_rows = 9;
        assert_ne!(CacheKey::for_fetch(&base).unwrap(), CacheKey::for_fetch(&other_skip).unwrap());

        let mut other_sheet = base.clone();
        other_sheet.gap_sheet = "Graf 2.2.5".into();
        assert_ne!(CacheKey::for_fetch(&base).unwrap(), CacheKey::for_fetch(&other_sheet).unwrap());

        let mut other_focus = base.clone();
        other_focus.focus_url = "https://mirror.example.org/focus".into();
        assert_ne!(CacheKey::for_fetch(&base).unwrap(), CacheKey::for_fetch(&other_focus).unwrap());

        let mut other_day = base.clone();
        other_day.fetched_on = d("2024-05-03");
        assert_ne!(CacheKey::for_fetch(&base).unwrap(), CacheKey::for_fetch(&other_day).unwrap());
    }

    #[test]
    fn compute_runs_once_per_key() {
        let mut cache = PipelineCache::in_memory();
        let key = fetch_key();
        let mut calls = 0;

        for _ in 0..3 {
            cache
                .get_or_try_insert_with(key.clone(), || {
                    calls += 1;
                    Ok(empty_output("x"))
                })
                .unwrap();
        }
        assert_eq!(calls, 1);

        assert!(cache.invalidate(&key).unwrap());
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn failed_compute_is_not_cached() {
        let mut cache = PipelineCache::in_memory();
        let key = fetch_key();
        let res = cache.get_or_try_insert_with(key.clone(), || Err(AppError::new(4, "boom")));
        assert!(res.is_err());
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn persists_across_instances_and_clears() {
        let tmp = tempfile::tempdir().unwrap();
        let key = fetch_key();

        let mut first = PipelineCache::persistent(tmp.path()).unwrap();
        first.insert(key.clone(), empty_output("saved")).unwrap();
        assert_eq!(first.dir(), Some(tmp.path()));

        let mut second = PipelineCache::persistent(tmp.path()).unwrap();
        assert_eq!(second.get(&key), Some(empty_output("saved")));

        second.clear().unwrap();
        let mut third = PipelineCache::persistent(tmp.path()).unwrap();
        assert!(third.get(&key).is_none());
    }

    #[test]
    fn corrupt_entry_is_a_miss() {
        let tmp = tempfile::tempdir().unwrap();
        let key = fetch_key();
        let mut cache = PipelineCache::persistent(tmp.path()).unwrap();
        fs::write(tmp.path().join(format!("{}.json", key.as_str())), "{not json").unwrap();

        assert!(cache.get(&key).is_none());
    }
}

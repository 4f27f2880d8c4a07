//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - parses CLI arguments (after loading `.env`)
//! - picks live or synthetic inputs
//! - runs the pipeline through the cache
//! - prints summaries/plots and writes optional exports

use chrono::{Local, NaiveDate};
use clap::Parser;
use log::info;

use crate::app::cache::{CacheKey, PipelineCache};
use crate::app::pipeline::RunOutput;
use crate::cli::{Command, PlotArgs, RunArgs};
use crate::data::{DataClient, RawSource, SourceConfig, SyntheticSource};
use crate::domain::{ChartFrame, Frequency, Period, PipelineConfig};
use crate::error::AppError;

pub mod cache;
pub mod pipeline;

/// Entry point for the `nr` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; variables may come from the real environment.
    let _ = dotenvy::dotenv();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(args, OutputMode::Full),
        Command::Summary(args) => handle_run(args, OutputMode::SummaryOnly),
        Command::Plot(args) => handle_plot(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    SummaryOnly,
}

fn handle_run(args: RunArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = PipelineConfig::default();
    let fetched_on = args.as_of.unwrap_or_else(|| Local::now().date_naive());

    let mut cache = match &args.cache_dir {
        Some(dir) => PipelineCache::persistent(dir)?,
        None => PipelineCache::in_memory(),
    };
    if args.clear_cache {
        cache.clear()?;
        if let Some(dir) = cache.dir() {
            info!("cleared cache in {}", dir.display());
        }
    }
    let run = compute(&args, fetched_on, &config, &mut cache)?;

    println!("{}", crate::report::format_run_summary(&run, fetched_on, &config));

    if mode == OutputMode::Full && !args.no_plot {
        for (_, frame) in run.charts.frames() {
            println!("{}", crate::plot::render_chart(frame, args.width, args.height));
        }
    }

    if let Some(dir) = &args.export_dir {
        let written = crate::io::write_run_exports(dir, &run)?;
        info!("wrote {} export files to {}", written.len(), dir.display());
    }

    Ok(())
}

/// Run the pipeline for `args`, reusing a cached output when allowed.
///
/// Live runs are keyed by fetch date and source settings so a cache hit
/// skips the network. Offline runs are keyed by the synthetic bundle itself.
fn compute(
    args: &RunArgs,
    fetched_on: NaiveDate,
    config: &PipelineConfig,
    cache: &mut PipelineCache,
) -> Result<RunOutput, AppError> {
    if args.offline {
        let source = offline_source(fetched_on, args.offline_quarters);
        let inputs = source.load()?;
        let key = CacheKey::for_inputs(&inputs)?;
        if args.refresh {
            cache.invalidate(&key)?;
        }
        return cache.get_or_try_insert_with(key, || Ok(pipeline::run_pipeline(&inputs, config)?));
    }

    let sources = source_config_from_args(args, fetched_on);
    let key = CacheKey::for_fetch(&sources)?;
    if args.refresh {
        cache.invalidate(&key)?;
    }
    let client = DataClient::new(sources);
    cache.get_or_try_insert_with(key, || Ok(pipeline::run_from_source(&client, config)?))
}

/// Synthetic window ending with the quarter before `fetched_on`.
fn offline_source(fetched_on: NaiveDate, quarters: usize) -> SyntheticSource {
    let current = Period::containing(fetched_on, Frequency::Quarterly);
    SyntheticSource {
        first_quarter: current.offset(-(quarters as i64)),
        quarters,
        fetched_on,
    }
}

pub fn source_config_from_args(args: &RunArgs, fetched_on: NaiveDate) -> SourceConfig {
    SourceConfig {
        focus_url: args.focus_url.clone(),
        sgs_url: args.sgs_url.clone(),
        tesouro_url: args.tesouro_url.clone(),
        gap_url: args.gap_url.clone(),
        gap_sheet: args.gap_sheet.clone(),
        gap_csv: args.gap_csv.clone(),
        gap_skip_rows: args.gap_skip_rows,
        fetched_on,
    }
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    if let Some(path) = &args.bundle {
        let run = crate::io::read_run_bundle(path)?;
        for frame in bundle_frames(&run, args.chart.as_deref())? {
            println!("{}", crate::plot::render_chart(frame, args.width, args.height));
        }
        return Ok(());
    }

    let Some(path) = &args.frame else {
        return Err(AppError::new(2, "nr plot needs --frame or --bundle"));
    };
    let title = args.title.clone().unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });
    let frame = crate::io::read_frame_csv(path, title)?;
    println!("{}", crate::plot::render_chart(&frame, args.width, args.height));
    Ok(())
}

/// Frames of a saved run, optionally narrowed to one chart by name.
fn bundle_frames<'a>(run: &'a RunOutput, chart: Option<&str>) -> Result<Vec<&'a ChartFrame>, AppError> {
    let frames = run.charts.frames();
    let Some(name) = chart else {
        return Ok(frames.into_iter().map(|(_, f)| f).collect());
    };
    frames
        .into_iter()
        .find(|(n, _)| *n == name)
        .map(|(_, f)| vec![f])
        .ok_or_else(|| {
            let known: Vec<&str> = run.charts.frames().into_iter().map(|(n, _)| n).collect();
            AppError::new(2, format!("Unknown chart '{name}' (expected one of: {})", known.join(", ")))
        })
}

/// Rewrite argv so `nr` defaults to `nr run`.
///
/// Rules:
/// - `nr`                      -> `nr run`
/// - `nr --offline ...`        -> `nr run --offline ...`
/// - `nr --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "summary" | "plot");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
    }
    argv
}

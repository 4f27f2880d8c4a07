//! Formatted terminal output.
//!
//! Formatting lives here so the rate code stays free of presentation and
//! output changes stay localized.

use chrono::NaiveDate;

use crate::app::pipeline::RunOutput;
use crate::domain::{ChartFrame, PipelineConfig};
use crate::report::{ProxySummary, summarize};

/// Header, term premia and one summary table per output.
pub fn format_run_summary(run: &RunOutput, fetched_on: NaiveDate, config: &PipelineConfig) -> String {
    let mut out = String::new();

    out.push_str("=== nr - Brazilian neutral real rate proxies ===\n");
    out.push_str(&format!("Fetched on: {fetched_on}\n"));
    out.push_str(&format!(
        "HP lambda: {} | survey horizons: t+{} / t+{} | NTN-B: {} / {}\n",
        config.hp_lambda,
        config.short_horizon_years,
        config.long_horizon_years,
        config.short_maturity_year,
        config.long_maturity_year,
    ));

    out.push_str("\nTerm premia (mean NTN-B minus 4-year Focus real rate):\n");
    for (label, premium) in &run.term_premia {
        out.push_str(&format!("- {label}: {premium:.3} p.p.\n"));
    }

    for (name, frame) in run.charts.frames() {
        out.push('\n');
        out.push_str(&format!("[{name}] {}\n", frame.title));
        out.push_str(&format_frame_summary(frame));
    }

    out
}

/// Summary table of one chart frame.
pub fn format_frame_summary(frame: &ChartFrame) -> String {
    let summaries = summarize(frame);
    if summaries.is_empty() {
        return "(no data)\n".to_string();
    }

    let mut out = String::new();
    out.push_str(
        format!(
            "{:<48} {:>4} {:>10} {:>10} {:>8} {:>8} {:>8}",
            "proxy", "n", "first", "last", "last", "min", "max"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(&format!(
        "{:-<48} {:-<4} {:-<10} {:-<10} {:-<8} {:-<8} {:-<8}\n",
        "", "", "", "", "", "", ""
    ));
    for s in &summaries {
        out.push_str(&format_row(s));
        out.push('\n');
    }
    out
}

fn format_row(s: &ProxySummary) -> String {
    format!(
        "{:<48} {:>4} {:>10} {:>10} {:>8.3} {:>8.3} {:>8.3}",
        truncate(&s.label, 48),
        s.n,
        s.first,
        s.last,
        s.last_value,
        s.min,
        s.max
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

//! Output rendering
//!
//! Text output mirrors the two sections of a run (event log, resulting table).
//! JSON output carries the structured rows plus the input counters.

use anyhow::Result;
use race_log_engine::{CompetitorSummary, EngineStats, ParseStats};
use serde::Serialize;

/// Everything a run produces
pub struct RaceOutput {
    pub log: String,
    pub summaries: Vec<CompetitorSummary>,
    pub parse_stats: ParseStats,
    pub engine_stats: EngineStats,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    log: Vec<&'a str>,
    results: &'a [CompetitorSummary],
    parse_stats: ParseStats,
    engine_stats: EngineStats,
}

/// Plain-text output: the event log followed by the ranked table
pub fn render_text(output: &RaceOutput) -> String {
    let table = race_log_engine::summary::format_report(&output.summaries);
    format!(
        "=== Output log ===\n{}\n\n=== Resulting table ===\n{}\n",
        output.log, table
    )
}

/// Pretty-printed JSON output
pub fn render_json(output: &RaceOutput) -> Result<String> {
    let report = JsonReport {
        log: output.log.lines().collect(),
        results: &output.summaries,
        parse_stats: output.parse_stats,
        engine_stats: output.engine_stats,
    };
    Ok(serde_json::to_string_pretty(&report)? + "\n")
}

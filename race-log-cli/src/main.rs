//! Race Log CLI Application
//!
//! This is the command-line interface for the race log engine.
//! It uses the race-log-engine library and adds:
//! - Configuration loading (JSON or TOML)
//! - Event file loading
//! - Text and JSON output rendering

use anyhow::Result;
use clap::Parser;
use race_log_engine::RaceProcessor;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

mod config;
mod report;

/// Race Log - Build the event log and final results of a biathlon race
#[derive(Parser, Debug)]
#[command(name = "race-log-cli")]
#[command(about = "Process biathlon race events into a log and a ranked results table", long_about = None)]
#[command(version)]
struct Args {
    /// Path to race configuration file (JSON, or TOML with a .toml extension)
    #[arg(short, long, value_name = "FILE", default_value = "sunny_5_skiers/config.json")]
    config: PathBuf,

    /// Path to the event file
    #[arg(short, long, value_name = "FILE", default_value = "sunny_5_skiers/events")]
    events: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Emit the results as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Race Log CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using engine library v{}", race_log_engine::VERSION);

    // Configuration errors stop the run before any event is read
    let config = config::load_config(&args.config)?;
    match config.start_time() {
        Ok(start) => log::info!(
            "Race start scheduled at {}",
            race_log_engine::clock::format_timestamp(&start)
        ),
        Err(e) => log::warn!("Scheduled race start is not a valid time: {}", e),
    }

    let events = config::load_events(&args.events)?;
    let mut processor = RaceProcessor::new(config, &events);
    let log_text = processor.process_events();

    let parse_stats = processor.parse_stats();
    let engine_stats = processor.engine_stats();
    log::info!(
        "Processed {} of {} lines ({} blank, {} dropped)",
        parse_stats.parsed_lines(),
        parse_stats.total_lines,
        parse_stats.blank_lines,
        parse_stats.dropped_lines
    );
    log::info!(
        "Applied {} events ({} unknown type, {} bad parameters)",
        engine_stats.applied_events,
        engine_stats.ignored_events,
        engine_stats.rejected_events
    );

    let output = report::RaceOutput {
        log: log_text,
        summaries: processor.summaries(),
        parse_stats,
        engine_stats,
    };
    let rendered = if args.json {
        report::render_json(&output)?
    } else {
        report::render_text(&output)
    };

    write_output(args.output.as_deref(), &rendered)
}

/// Write rendered output to a file, or stdout if no path was given
fn write_output(path: Option<&Path>, rendered: &str) -> Result<()> {
    use anyhow::Context;

    match path {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write output file: {:?}", path))?;
            log::info!("Results written to {:?}", path);
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

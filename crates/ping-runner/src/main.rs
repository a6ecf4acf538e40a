//! # ping-runner
//!
//! One-shot entry point for the ping dashboard backend.
//!
//! Loads a JSON configuration file, reads the daily ping logs, aggregates the
//! history into hourly buckets and prints one JSON report to stdout:
//!
//! ```json
//! {
//!   "generated_at": 1626462600000,
//!   "files": ["210716.txt", "210717.txt"],
//!   "recent": { "summary": { "time": ..., "min": ..., ... }, "pings": [...] },
//!   "history": [{ "time": ..., "min": ..., "max": ..., "avg": ..., "lostRatio": ..., "count": ... }]
//! }
//! ```
//!
//! # Usage
//!
//! ```bash
//! ping-runner config.json --log-level info --pretty
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use tracing::info;

use ping_core::aggregate::{hourly_buckets, hourly_buckets_filled, point_stats};
use ping_core::config::HistoryConfig;
use ping_core::log_source::{log_files, read_log};
use ping_core::{Bucket, Sample};

/// Ping log aggregation runner.
#[derive(Parser)]
#[command(name = "ping-runner", about = "Aggregate ping logs into dashboard JSON")]
struct Cli {
    /// Configuration file path (JSON).
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Optional log directory for file output; overrides the config.
    #[arg(long)]
    log_dir: Option<String>,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    generated_at: i64,
    files: Vec<String>,
    recent: Recent,
    history: Vec<Bucket>,
}

#[derive(Debug, Serialize)]
struct Recent {
    summary: Bucket,
    pings: Vec<Sample>,
}

/// Summarise the recent pings and aggregate the history selection.
fn build_report(
    generated_at: i64,
    files: Vec<String>,
    recent: Vec<Sample>,
    history: &[Sample],
    mode: &HistoryConfig,
) -> Report {
    let summary = point_stats(
        recent.first().map_or(0, |p| p.time_ms),
        recent.iter().map(|p| p.latency_ms),
    );
    let history = if mode.effective_gap_fill() {
        hourly_buckets_filled(history)
    } else {
        hourly_buckets(history.iter().copied())
            .with_boundary(mode.effective_boundary())
            .collect()
    };
    Report { generated_at, files, recent: Recent { summary, pings: recent }, history }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration
    let config = ping_core::config::load_config(&cli.config)?;

    // 2. Initialize logging
    let log_dir = cli.log_dir.clone().or_else(|| config.log_path());
    ping_core::logging::init_logging(&cli.log_level, log_dir.as_deref(), &config.module_name())?;

    let ping_dir = config.effective_log_dir();
    info!("ping-runner starting, config={}, ping logs={}", cli.config.display(), ping_dir.display());

    // 3. Read the logs off the async runtime
    let recent_query = config.recent.to_query();
    let history_query = config.history.to_query();
    let (files, recent, history) = tokio::task::spawn_blocking(move || {
        let files = log_files(&ping_dir);
        let recent = read_log(&ping_dir, &recent_query)?;
        let history = read_log(&ping_dir, &history_query)?;
        Ok::<_, ping_core::error::PingError>((files, recent, history))
    })
    .await??;
    info!(
        "{} log file(s), {} recent ping(s), {} history ping(s)",
        files.len(),
        recent.len(),
        history.len(),
    );

    // 4. Aggregate and emit
    let report = build_report(ping_core::time_util::now_ms(), files, recent, &history, &config.history);
    info!("recent: {}", report.recent.summary);
    info!("history: {} hour bucket(s)", report.history.len());

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}

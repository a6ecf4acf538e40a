//! Diagnostics for the ping tools.
//!
//! The runner's stdout carries exactly one JSON report, so nothing here writes
//! to it. Diagnostics go to stderr, plus an optional daily file named after
//! the module (`<log_dir>/<module>.YYYY-MM-DD`) when a log directory is
//! configured. `RUST_LOG` takes precedence over the level passed in.

use std::io::IsTerminal;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter from `RUST_LOG`, falling back to `default_level` when the variable
/// is unset or unparsable.
fn level_filter(env: Option<&str>, default_level: &str) -> EnvFilter {
    env.and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(log_level: &str, log_dir: Option<&str>, module_name: &str) -> Result<()> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = level_filter(env.as_deref(), log_level);

    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal());

    // `Option<Layer>` is itself a layer, so a missing log dir just disables it.
    let file = log_dir.map(|dir| {
        fmt::layer()
            .with_writer(tracing_appender::rolling::daily(dir, module_name))
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file)
        .try_init()
        .context("tracing subscriber already installed")
}

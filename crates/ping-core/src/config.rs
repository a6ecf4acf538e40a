//! Configuration for the ping dashboard runner.
//!
//! Settings come from a single JSON file. Every field except the module block
//! is optional and falls back to the dashboard's defaults.
//!
//! # Example config
//!
//! ```json
//! {
//!   "PingDash": { "module_name": "ping-runner", "log_path": "/tmp/log" },
//!   "log_dir": "/var/lib/ping/log",
//!   "recent": { "count": 60 },
//!   "history": { "count": 1440, "gap_fill": true, "boundary": "retain" }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::aggregate::Boundary;
use crate::error::PingError;
use crate::log_source::{DEFAULT_QUERY_COUNT, LogQuery};

/// Default number of history samples: one day at one ping a minute.
pub const DEFAULT_HISTORY_COUNT: usize = 60 * 24;

/// Top-level application config, deserialized from a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Module metadata (name, log path).
    #[serde(rename = "PingDash")]
    pub ping_dash: Option<ModuleMeta>,

    /// Directory holding the daily `YYMMDD.txt` ping logs (default: `log`).
    pub log_dir: Option<PathBuf>,

    /// Selection for the "recent pings" summary.
    #[serde(default)]
    pub recent: RecentConfig,

    /// Selection and aggregation mode for the hourly history.
    #[serde(default)]
    pub history: HistoryConfig,
}

/// Module metadata block.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleMeta {
    pub module_name: Option<String>,
    pub log_path: Option<String>,
}

impl AppConfig {
    /// Returns the module name, defaulting to `"ping-runner"`.
    pub fn module_name(&self) -> String {
        self.ping_dash
            .as_ref()
            .and_then(|m| m.module_name.clone())
            .unwrap_or_else(|| "ping-runner".to_string())
    }

    /// Returns the directory for the runner's own log files.
    pub fn log_path(&self) -> Option<String> {
        self.ping_dash.as_ref().and_then(|m| m.log_path.clone())
    }

    /// Returns the ping log directory.
    pub fn effective_log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| PathBuf::from("log"))
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), PingError> {
        self.recent.to_query().validate().map_err(|e| PingError::Config(format!("recent: {e}")))?;
        self.history.to_query().validate().map_err(|e| PingError::Config(format!("history: {e}")))?;
        Ok(())
    }
}

/// Recent-pings selection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentConfig {
    /// Number of newest samples to summarise (default: 60).
    pub count: Option<usize>,
}

impl RecentConfig {
    pub fn to_query(&self) -> LogQuery {
        LogQuery { count: self.count.unwrap_or(DEFAULT_QUERY_COUNT), ..LogQuery::default() }
    }
}

/// History selection and aggregation settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryConfig {
    /// Maximum samples read (default: 1440).
    pub count: Option<usize>,
    /// Samples skipped after `start` (default: 0).
    pub offset: Option<usize>,
    /// Newer bound, epoch milliseconds (default: 0, unbounded).
    pub start: Option<i64>,
    /// Older bound, epoch milliseconds (default: 0, unbounded).
    pub end: Option<i64>,
    /// Emit explicit empty buckets for silent hours via the eager
    /// aggregator (default: true).
    pub gap_fill: Option<bool>,
    /// Window-closing policy for the streaming aggregator (default: retain).
    pub boundary: Option<Boundary>,
}

impl HistoryConfig {
    pub fn to_query(&self) -> LogQuery {
        LogQuery {
            offset: self.offset.unwrap_or(0),
            count: self.count.unwrap_or(DEFAULT_HISTORY_COUNT),
            start: self.start.unwrap_or(0),
            end: self.end.unwrap_or(0),
        }
    }

    pub fn effective_gap_fill(&self) -> bool {
        self.gap_fill.unwrap_or(true)
    }

    pub fn effective_boundary(&self) -> Boundary {
        self.boundary.unwrap_or_default()
    }
}

/// Parse and validate a JSON config string.
pub fn parse_config(content: &str) -> anyhow::Result<AppConfig> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load and parse a JSON config file.
pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let cfg = parse_config("{}").unwrap();
        assert_eq!(cfg.module_name(), "ping-runner");
        assert_eq!(cfg.effective_log_dir(), PathBuf::from("log"));
        assert_eq!(cfg.recent.to_query().count, 60);
        assert_eq!(cfg.history.to_query().count, 1440);
        assert!(cfg.history.effective_gap_fill());
        assert_eq!(cfg.history.effective_boundary(), Boundary::Retain);
    }

    #[test]
    fn full_config() {
        let cfg = parse_config(
            r#"{
                "PingDash": { "module_name": "dash", "log_path": "/tmp/dash" },
                "log_dir": "/var/ping",
                "recent": { "count": 30 },
                "history": { "count": 100, "offset": 5, "start": 2000, "end": 1000,
                             "gap_fill": false, "boundary": "discard" }
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.module_name(), "dash");
        assert_eq!(cfg.log_path().as_deref(), Some("/tmp/dash"));
        assert_eq!(cfg.effective_log_dir(), PathBuf::from("/var/ping"));
        assert_eq!(cfg.recent.to_query().count, 30);
        assert_eq!(cfg.history.to_query(), LogQuery { offset: 5, count: 100, start: 2000, end: 1000 });
        assert!(!cfg.history.effective_gap_fill());
        assert_eq!(cfg.history.effective_boundary(), Boundary::Discard);
    }

    #[test]
    fn inverted_history_range_rejected() {
        let err = parse_config(r#"{ "history": { "start": 1000, "end": 2000 } }"#).unwrap_err();
        assert!(err.to_string().contains("history"));
    }

    #[test]
    fn unknown_boundary_rejected() {
        assert!(parse_config(r#"{ "history": { "boundary": "sideways" } }"#).is_err());
    }
}

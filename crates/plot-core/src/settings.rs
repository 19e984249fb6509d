use chrono::{NaiveTime, TimeDelta};
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{PlotError, Result};
use crate::models::AnalysisConfig;
use crate::time_utils::parse_clock;

/// Level names accepted by `--log-level` and the config file.
pub const LOG_LEVELS: [&str; 5] = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Statistics and chart series for a daily event log
#[derive(Parser, Debug, Clone)]
#[command(
    name = "event-plot",
    about = "Statistics and chart series for a daily event log",
    version
)]
pub struct Settings {
    /// Event log to read (day-blocks, newest first)
    #[arg(default_value = "data.txt")]
    pub data_file: PathBuf,

    /// Moving-average window in days
    #[arg(long, default_value = "7", value_parser = clap::value_parser!(u32).range(1..))]
    pub average_period: u32,

    /// Minimum gap in hours before a morning event marks a quiet interval
    #[arg(long, default_value = "6", value_parser = clap::value_parser!(u32).range(1..=168))]
    pub quiet_gap_hours: u32,

    /// Start of the quiet-interval window, exclusive (HH:MM)
    #[arg(long, default_value = "06:30", value_parser = parse_clock)]
    pub quiet_window_start: NaiveTime,

    /// End of the quiet-interval window, exclusive (HH:MM)
    #[arg(long, default_value = "08:00", value_parser = parse_clock)]
    pub quiet_window_end: NaiveTime,

    /// Write the chart series and summary as JSON to this path
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Config file (defaults to ~/.event-plot/config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = LOG_LEVELS)]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── ConfigFile ─────────────────────────────────────────────────────────────────

/// Optional defaults read from `~/.event-plot/config.json`.
///
/// Any field left out keeps the CLI default; explicit CLI flags always win.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_period: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiet_gap_hours: Option<u32>,
    /// `HH:MM`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiet_window_start: Option<String>,
    /// `HH:MM`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiet_window_end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl ConfigFile {
    /// Return the default path to the config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".event-plot").join("config.json")
    }

    /// Load the config file at `path`.
    ///
    /// A missing file yields `Default`; an unreadable or invalid one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| PlotError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content)
            .map_err(|e| PlotError::Config(format!("invalid config file {}: {}", path.display(), e)))
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments and merge config-file values where no explicit CLI
    /// value was provided.
    pub fn load() -> Result<Self> {
        Self::load_impl(std::env::args_os().collect(), &ConfigFile::config_path())
    }

    /// Full implementation – accepts args and the fallback config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_impl(args: Vec<std::ffi::OsString>, default_config: &Path) -> Result<Self> {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        let file = match &settings.config {
            Some(path) if !path.exists() => {
                return Err(PlotError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load_from(default_config)?,
        };

        if !is_arg_explicitly_set(&matches, "average_period") {
            if let Some(v) = file.average_period {
                settings.average_period = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "quiet_gap_hours") {
            if let Some(v) = file.quiet_gap_hours {
                settings.quiet_gap_hours = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "quiet_window_start") {
            if let Some(v) = &file.quiet_window_start {
                settings.quiet_window_start = parse_clock(v).map_err(PlotError::Config)?;
            }
        }
        if !is_arg_explicitly_set(&matches, "quiet_window_end") {
            if let Some(v) = &file.quiet_window_end {
                settings.quiet_window_end = parse_clock(v).map_err(PlotError::Config)?;
            }
        }
        if !is_arg_explicitly_set(&matches, "log_level") {
            if let Some(v) = file.log_level {
                if !LOG_LEVELS.contains(&v.as_str()) {
                    return Err(PlotError::Config(format!(
                        "invalid log_level {:?}, expected one of {}",
                        v,
                        LOG_LEVELS.join(", ")
                    )));
                }
                settings.log_level = v;
            }
        }

        // --debug overrides log level.
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        Ok(settings)
    }

    /// Validated engine configuration derived from these settings.
    pub fn analysis_config(&self) -> Result<AnalysisConfig> {
        let config = AnalysisConfig {
            average_period: self.average_period as usize,
            quiet_gap: TimeDelta::hours(i64::from(self.quiet_gap_hours)),
            quiet_window_start: self.quiet_window_start,
            quiet_window_end: self.quiet_window_end,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

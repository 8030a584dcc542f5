use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::models::{Quantum, DEFAULT_QUANTUM_MINUTES};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Aggregate a "still working" timestamp log into time-spent statistics
#[derive(Parser, Debug, Clone)]
#[command(
    name = "timelog",
    about = "Aggregate a \"still working\" timestamp log into time-spent statistics",
    version
)]
pub struct Settings {
    /// Timestamp log file (default: ./log.txt, then ~/.timelog/log.txt)
    pub path: Option<PathBuf>,

    /// What to do with the log
    #[arg(long, default_value = "report", value_parser = ["report", "json", "record"])]
    pub mode: String,

    /// Quantum length in minutes; must divide a day evenly
    #[arg(long, default_value_t = DEFAULT_QUANTUM_MINUTES, allow_negative_numbers = true)]
    pub quantum: i64,

    /// Warn about and skip malformed lines instead of failing the run
    #[arg(long)]
    pub skip_invalid: bool,

    /// Show only the N most recent weeks
    #[arg(long)]
    pub weeks: Option<usize>,

    /// Show only the N most recent days
    #[arg(long)]
    pub days: Option<usize>,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Timezone the recorder stamps in (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Recorder interval in seconds (1-3600)
    #[arg(long, default_value = "300", value_parser = clap::value_parser!(u32).range(1..=3600))]
    pub interval: u32,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,

    /// Why `--clear` failed, if it did.
    #[arg(skip)]
    pub clear_error: Option<String>,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.timelog/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    /// Uses `~/.timelog/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".timelog").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments and merge with last-used params where no explicit
    /// CLI value was provided, then persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!(error = %e, "could not clear saved configuration");
                settings.clear_error = Some(e.to_string());
            }
            return settings.apply_debug();
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over persisted values.
        if settings.path.is_none() {
            settings.path = last.path;
        }
        if !is_arg_explicitly_set(&matches, "quantum") {
            if let Some(v) = last.quantum {
                settings.quantum = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone {
                settings.timezone = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "interval") {
            if let Some(v) = last.interval {
                settings.interval = v;
            }
        }

        settings = settings.apply_debug();

        let mut params = LastUsedParams::from(&settings);
        // A rejected quantum leaves the stored one in place.
        if params.quantum.is_none() {
            params.quantum = last.quantum;
        }
        if let Err(e) = params.save_to(config_path) {
            tracing::debug!(error = %e, "could not persist settings");
        }

        settings
    }

    /// Validated quantum; a zero, negative or non-divisor length is rejected
    /// here, before any input is parsed.
    pub fn quantum(&self) -> Result<Quantum> {
        Quantum::from_minutes(self.quantum)
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            path: s.path.clone(),
            // An invalid quantum is reported for this run, never remembered.
            quantum: s.quantum().ok().map(|q| q.minutes()),
            theme: Some(s.theme.clone()),
            timezone: Some(s.timezone.clone()),
            interval: Some(s.interval),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

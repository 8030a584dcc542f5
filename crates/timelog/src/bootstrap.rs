use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_NAME: &str = "log.txt";

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure `~/.timelog/` exists and return it.
pub fn ensure_directories() -> anyhow::Result<PathBuf> {
    ensure_directories_in(&home())
}

fn ensure_directories_in(home: &Path) -> anyhow::Result<PathBuf> {
    let timelog_dir = home.join(".timelog");
    std::fs::create_dir_all(&timelog_dir)?;
    Ok(timelog_dir)
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber, writing to stderr.
///
/// `RUST_LOG` wins when set; otherwise `log_level` is used.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level_directive(log_level)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;

    Ok(())
}

/// Map the CLI level names onto `tracing` directives.
fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

// ── Log-path discovery ─────────────────────────────────────────────────────────

/// Resolve the timestamp log to use.
///
/// An explicit path always wins. Otherwise the first existing of
/// `./log.txt` and `~/.timelog/log.txt` is used, falling back to
/// `./log.txt`.
pub fn discover_log_path(explicit: Option<&Path>) -> PathBuf {
    discover_log_path_in(explicit, Path::new("."), &home())
}

fn discover_log_path_in(explicit: Option<&Path>, cwd: &Path, home: &Path) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    let local = cwd.join(LOG_FILE_NAME);
    let candidates = [local.clone(), home.join(".timelog").join(LOG_FILE_NAME)];
    candidates
        .into_iter()
        .find(|p| p.is_file())
        .unwrap_or(local)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

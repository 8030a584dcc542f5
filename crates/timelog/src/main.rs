mod bootstrap;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use timelog_core::settings::Settings;
use timelog_core::time_utils::resolve_timezone;
use timelog_core::TimelogError;
use timelog_data::analysis::{analyze_file, AnalysisOptions};
use timelog_data::reader::ParsePolicy;
use timelog_report::{render_json, render_report, ReportLimits, Theme};
use timelog_runtime::recorder::TimestampRecorder;

#[tokio::main]
async fn main() -> ExitCode {
    let dirs = bootstrap::ensure_directories();
    let settings = Settings::load_with_last_used();

    if let Err(e) = bootstrap::setup_logging(&settings.log_level) {
        eprintln!("timelog: could not initialise logging: {e}");
    }
    if let Err(e) = dirs {
        tracing::warn!(error = %e, "could not create ~/.timelog");
    }

    tracing::info!("timelog v{} starting", env!("CARGO_PKG_VERSION"));

    match run(&settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("timelog: {e:#}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}

async fn run(settings: &Settings) -> Result<()> {
    if settings.clear {
        if let Some(e) = &settings.clear_error {
            anyhow::bail!("could not clear saved configuration: {e}");
        }
        println!("Saved configuration cleared.");
        return Ok(());
    }

    let quantum = settings.quantum()?;
    let path = bootstrap::discover_log_path(settings.path.as_deref());
    tracing::info!(path = %path.display(), mode = %settings.mode, quantum = %quantum, "resolved settings");

    let limits = ReportLimits {
        weeks: settings.weeks,
        days: settings.days,
    };
    let options = AnalysisOptions {
        quantum,
        policy: if settings.skip_invalid {
            ParsePolicy::SkipInvalid
        } else {
            ParsePolicy::FailFast
        },
    };

    match settings.mode.as_str() {
        "record" => record(settings, path).await,
        "json" => {
            let result = analyze_file(&path, options)
                .with_context(|| format!("analysing {}", path.display()))?;
            println!("{}", render_json(&result, limits)?);
            Ok(())
        }
        "report" => {
            let result = analyze_file(&path, options)
                .with_context(|| format!("analysing {}", path.display()))?;
            let theme = Theme::for_stdout(&settings.theme);
            print!("{}", render_report(&result, limits, &theme));
            Ok(())
        }
        unknown => Err(TimelogError::Config(format!("unknown mode: {unknown}")).into()),
    }
}

/// Append a timestamp every `--interval` seconds until Ctrl+C.
async fn record(settings: &Settings, path: PathBuf) -> Result<()> {
    let timezone = resolve_timezone(&settings.timezone).context("resolving --timezone")?;
    tracing::info!(
        path = %path.display(),
        interval = settings.interval,
        timezone = %timezone,
        "starting recorder"
    );

    let recorder = TimestampRecorder::new(
        path,
        Duration::from_secs(u64::from(settings.interval)),
        timezone,
    );
    let (mut rx, handle) = recorder.start();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            stamp = rx.recv() => match stamp {
                Some(stamp) => println!("{}", stamp.line),
                None => break,
            },
            _ = &mut ctrl_c => {
                tracing::info!("Ctrl+C received; stopping recorder");
                break;
            }
        }
    }

    handle.abort();
    Ok(())
}

/// Process exit status for a failed run.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<TimelogError>()
        .map_or(1, TimelogError::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_exit_code_for_timelog_errors() {
        let parse: anyhow::Error = TimelogError::TimestampParse {
            line: 3,
            content: "x".to_string(),
        }
        .into();
        assert_eq!(exit_code_for(&parse), 65);

        let config: anyhow::Error = TimelogError::Config("bad".to_string()).into();
        assert_eq!(exit_code_for(&config), 64);
    }

    #[test]
    fn test_exit_code_for_other_errors() {
        assert_eq!(exit_code_for(&anyhow::anyhow!("boom")), 1);
    }

    #[tokio::test]
    async fn test_run_rejects_bad_quantum_before_reading() {
        let settings =
            Settings::parse_from(["timelog", "/definitely/not/here.txt", "--quantum", "7"]);
        let err = run(&settings).await.unwrap_err();
        assert_eq!(exit_code_for(&err), 64);
    }

    #[tokio::test]
    async fn test_run_missing_file_is_file_error() {
        let settings = Settings::parse_from(["timelog", "/definitely/not/here.txt"]);
        let err = run(&settings).await.unwrap_err();
        assert_eq!(exit_code_for(&err), 66);
    }

    #[tokio::test]
    async fn test_run_clear_reports_failure() {
        let mut settings = Settings::parse_from(["timelog", "--clear"]);
        settings.clear_error = Some("permission denied".to_string());

        let err = run(&settings).await.unwrap_err();
        assert!(err.to_string().contains("permission denied"));
        assert_eq!(exit_code_for(&err), 1);
    }

    #[tokio::test]
    async fn test_run_clear_succeeds() {
        let settings = Settings::parse_from(["timelog", "--clear"]);
        run(&settings).await.unwrap();
    }

    #[tokio::test]
    async fn test_run_undecodable_line_is_parse_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("log.txt");
        std::fs::write(&path, b"2016-02-17T10:31:00+01:00\n\xff\n").unwrap();

        let settings = Settings::parse_from(["timelog", path.to_str().unwrap(), "--mode", "json"]);
        let err = run(&settings).await.unwrap_err();
        assert_eq!(exit_code_for(&err), 65);
    }

    #[tokio::test]
    async fn test_run_json_mode_on_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("log.txt");
        std::fs::write(&path, "2016-02-17T10:31:00+01:00\n").unwrap();

        let settings = Settings::parse_from([
            "timelog",
            path.to_str().unwrap(),
            "--mode",
            "json",
        ]);
        run(&settings).await.unwrap();
    }
}

//! Periodic timestamp recorder.
//!
//! Appends the current time to the log at a fixed interval in a tokio task,
//! reporting every successful write through an `mpsc` channel. Write failures
//! are logged and the loop keeps running.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use timelog_core::error::Result;
use timelog_core::models::Instant;
use timelog_core::time_utils::{format_stamp, now_in};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

// ── Public types ──────────────────────────────────────────────────────────────

/// One line written to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedStamp {
    pub instant: Instant,
    /// The line as written, without the trailing newline.
    pub line: String,
}

// ── TimestampRecorder ─────────────────────────────────────────────────────────

/// Background "still working" writer.
///
/// Call [`TimestampRecorder::start`] to spawn the loop and receive a channel
/// of [`RecordedStamp`]s.
#[derive(Debug, Clone)]
pub struct TimestampRecorder {
    path: PathBuf,
    interval: Duration,
    timezone: Tz,
}

impl TimestampRecorder {
    pub fn new(path: impl Into<PathBuf>, interval: Duration, timezone: Tz) -> Self {
        Self {
            path: path.into(),
            interval,
            timezone,
        }
    }

    /// Start the recording loop.
    ///
    /// The first stamp is written immediately, then one per interval. The
    /// loop exits once the receiver is dropped.
    pub fn start(self) -> (mpsc::Receiver<RecordedStamp>, RecorderHandle) {
        let (tx, rx) = mpsc::channel(16);

        let handle = tokio::spawn(async move {
            self.recording_loop(tx).await;
        });

        (rx, RecorderHandle { handle })
    }

    // ── Private implementation ────────────────────────────────────────────

    async fn recording_loop(self, tx: mpsc::Sender<RecordedStamp>) {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            if tx.is_closed() {
                tracing::debug!("recorder channel closed; exiting loop");
                break;
            }

            let instant = now_in(&self.timezone);
            let line = format_stamp(&instant);

            match append_stamp(&self.path, &line).await {
                Ok(()) => {
                    tracing::debug!(stamp = %line, path = %self.path.display(), "recorded timestamp");
                    if tx.send(RecordedStamp { instant, line }).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, path = %self.path.display(), "failed to record timestamp");
                }
            }
        }
    }
}

// ── RecorderHandle ────────────────────────────────────────────────────────────

/// A handle to the background recording task.
pub struct RecorderHandle {
    handle: tokio::task::JoinHandle<()>,
}

impl RecorderHandle {
    /// Immediately abort the recording loop.
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Append `line` plus a newline to `path`, creating the file and its parent
/// directory when missing.
pub async fn append_stamp(path: &Path, line: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(format!("{line}\n").as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

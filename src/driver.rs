//! Driver runs a session against a frame source on tokio

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::config::Config;
use crate::host::Host;
use crate::provider::FrameSource;
use crate::session::{FrameOutcome, Session};
use crate::writer::WriterReport;
use crate::{DumpError, Result};

const MAX_ADVANCE_ERRORS: u32 = 10;

/// Totals for one driven session
#[derive(Debug, Clone, PartialEq)]
pub struct DriverReport {
    /// Frames the source advanced to
    pub frames: u64,
    /// Frames that pushed a sample
    pub queued: u64,
    /// Frames rejected by the spline filter
    pub skipped: u64,
    /// Frames whose update failed
    pub frame_errors: u64,
    pub writer: WriterReport,
}

/// Handle to a running driver task
pub struct DriverHandle {
    /// Cancelling stops the frame loop; the session is still shut down cleanly
    pub cancel: CancellationToken,
    pub task: JoinHandle<Result<DriverReport>>,
}

impl DriverHandle {
    /// Wait for the driver to finish
    pub async fn join(self) -> Result<DriverReport> {
        self.task.await.map_err(|e| DumpError::Task { details: e.to_string() })?
    }

    /// Cancel the frame loop and wait for the session to shut down
    pub async fn stop(self) -> Result<DriverReport> {
        self.cancel.cancel();
        self.join().await
    }
}

/// Drives per-frame updates from a [`FrameSource`].
///
/// The session is started inside the task so start-up failures surface
/// through [`DriverHandle::join`].
pub struct FrameDriver;

impl FrameDriver {
    /// Spawn a driver task for `host`. Must be called inside a tokio runtime.
    pub fn spawn<H>(host: H, config: Config) -> DriverHandle
    where
        H: Host + FrameSource,
    {
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        let task = tokio::spawn(async move { Self::run(host, config, cancel_task).await });

        DriverHandle { cancel, task }
    }

    async fn run<H>(mut host: H, config: Config, cancel: CancellationToken) -> Result<DriverReport>
    where
        H: Host + FrameSource,
    {
        let mut session = Session::start(&mut host, &config)?;
        let delta = 1.0 / host.tick_rate();
        info!(path = %session.path().display(), delta, "Frame driver started");

        let mut frames = 0u64;
        let mut queued = 0u64;
        let mut skipped = 0u64;
        let mut frame_errors = 0u64;
        let mut advance_errors = 0u32;

        loop {
            let advanced = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Frame driver cancelled");
                    break;
                }
                result = host.advance() => result,
            };

            match advanced {
                Ok(true) => {
                    advance_errors = 0;
                    frames += 1;
                }
                Ok(false) => {
                    info!("Frame source ended after {} frames", frames);
                    break;
                }
                Err(e) => {
                    advance_errors += 1;
                    error!("Frame source error ({}/{}): {}", advance_errors, MAX_ADVANCE_ERRORS, e);
                    if advance_errors >= MAX_ADVANCE_ERRORS {
                        error!("Too many frame source errors, shutting down");
                        break;
                    }
                    // 50ms, 100ms, 200ms, ...
                    let backoff = Duration::from_millis(50 * (1 << advance_errors.min(5)));
                    tokio::time::sleep(backoff).await;
                    continue;
                }
            }

            match session.update(&mut host, delta) {
                Ok(FrameOutcome::Queued) => queued += 1,
                Ok(FrameOutcome::Skipped) => skipped += 1,
                Err(DumpError::WriterStopped) => {
                    frame_errors += 1;
                    warn!("Writer stopped, ending frame loop");
                    break;
                }
                Err(e) => {
                    frame_errors += 1;
                    warn!(frame = frames, "Frame update failed: {}", e);
                }
            }
            trace!(frames, queued, skipped, "Frame processed");
        }

        debug!(depth = session.queue_depth(), "Draining writer");
        let writer = tokio::task::spawn_blocking(move || session.shutdown())
            .await
            .map_err(|e| DumpError::Task { details: e.to_string() })??;

        info!(frames, queued, skipped, frame_errors, rows = writer.rows_written, "Frame driver finished");
        Ok(DriverReport { frames, queued, skipped, frame_errors, writer })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ScriptedHost;
    use crate::test_utils::{frames_at, read_rows};
    use crate::types::CarStateField;
    use crate::writer;

    fn config_in(dir: &std::path::Path) -> Config {
        Config { output_dir: dir.to_path_buf(), ..Config::default() }
    }

    #[tokio::test]
    async fn drives_script_to_completion() {
        let dir = tempfile::tempdir().unwrap();
        let host = ScriptedHost::new(frames_at(&[0.1, 0.1, 0.2, 0.3, 0.3]));

        let report = FrameDriver::spawn(host, config_in(dir.path())).join().await.unwrap();

        assert_eq!(report.frames, 5);
        assert_eq!(report.queued, 3);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.frame_errors, 0);
        assert_eq!(report.writer.rows_written, 3);
        assert!(report.writer.terminated);
        assert_eq!(read_rows(&report.writer.path).len(), 4);
    }

    #[tokio::test]
    async fn frame_errors_do_not_stop_the_loop() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ScriptedHost::new(frames_at(&[0.1, 0.2, 0.3]));
        host.fail_on(CarStateField::Rpm);

        let report = FrameDriver::spawn(host, config_in(dir.path())).join().await.unwrap();

        assert_eq!(report.frames, 3);
        assert_eq!(report.frame_errors, 3);
        assert_eq!(report.queued, 0);
        assert_eq!(report.writer.rows_written, 0);
    }

    #[tokio::test]
    async fn cancel_still_shuts_session_down() {
        let dir = tempfile::tempdir().unwrap();
        let positions: Vec<f64> = (0..100_000).map(|i| i as f64 / 100_000.0).collect();
        let host = ScriptedHost::new(frames_at(&positions));

        let handle = FrameDriver::spawn(host, config_in(dir.path()));
        let report = handle.stop().await.unwrap();

        assert!(report.frames < positions.len() as u64);
        assert!(report.writer.terminated);
        assert_eq!(report.writer.rows_written, report.queued);
    }

    #[tokio::test]
    async fn writer_failure_ends_the_loop_and_surfaces_through_join() {
        let dir = tempfile::tempdir().unwrap();
        // block every file name the session could pick around now
        let now = chrono::Local::now().naive_local();
        for offset in -5..=30 {
            let started_at = now + chrono::TimeDelta::seconds(offset);
            let name = writer::session_file_name("ks_mazda_mx5_cup", "magione", &started_at);
            std::fs::create_dir(dir.path().join(name)).unwrap();
        }
        // never ends on its own; only the writer failure can stop it
        let host = ScriptedHost::new(frames_at(&[0.1, 0.2])).repeating();

        let handle = FrameDriver::spawn(host, config_in(dir.path()));
        let joined = tokio::time::timeout(Duration::from_secs(30), handle.join()).await;

        let err = joined.expect("frame loop should stop once the writer is gone").unwrap_err();
        assert!(matches!(err, DumpError::File { .. }), "{err}");
    }

    #[tokio::test]
    async fn start_failure_surfaces_through_join() {
        let host = ScriptedHost::new(frames_at(&[0.1]));
        let config = Config {
            output_dir: std::path::PathBuf::from("/nonexistent/metricdump/output"),
            ..Config::default()
        };

        let err = FrameDriver::spawn(host, config).join().await.unwrap_err();
        assert!(matches!(err, DumpError::File { .. }));
    }
}

//! Session context tying the sampler, channel and writer together
//!
//! A [`Session`] is created when the host loads the app and torn down when it
//! unloads it. It owns every piece of per-session state: the spline filter,
//! the producer half of the channel, the writer thread and the status label.

use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::host::{LabelId, SessionIdentity, StatusDisplay, TelemetrySource};
use crate::queue::{SampleSender, sample_channel};
use crate::sampler::Sampler;
use crate::writer::{self, Writer, WriterHandle, WriterReport};
use crate::{DumpError, Result};

const WINDOW_SIZE: (f32, f32) = (200.0, 75.0);
const LABEL_POSITION: (f32, f32) = (10.0, 30.0);

/// What one frame did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A sample was pushed to the writer
    Queued,
    /// The spline position did not move; nothing was pushed
    Skipped,
}

fn depth_text(depth: usize) -> String {
    format!("Buffer size: {depth}")
}

/// One recording session.
pub struct Session {
    sampler: Sampler,
    sender: SampleSender,
    writer: Option<WriterHandle>,
    label: LabelId,
    path: PathBuf,
    frames: u64,
}

impl Session {
    /// Start a session stamped with the current local time.
    pub fn start<H>(host: &mut H, config: &Config) -> Result<Self>
    where
        H: SessionIdentity + StatusDisplay + ?Sized,
    {
        Self::start_at(host, config, Local::now().naive_local())
    }

    /// Start a session stamped with `started_at`.
    ///
    /// Creates the host window, prepares the session file (header only when
    /// the file is new), spawns the writer thread and adds the depth label.
    pub fn start_at<H>(host: &mut H, config: &Config, started_at: NaiveDateTime) -> Result<Self>
    where
        H: SessionIdentity + StatusDisplay + ?Sized,
    {
        config.validate()?;

        let window = host.new_app(&config.app_name);
        host.set_size(window, WINDOW_SIZE.0, WINDOW_SIZE.1);

        let car_name = host.car_name(config.car_index)?;
        let track_name = host.track_name(config.car_index)?;
        let path = config
            .output_dir
            .join(writer::session_file_name(&car_name, &track_name, &started_at));
        let created = writer::prepare_session_file(&path, config.columns)?;

        let (sender, receiver) = sample_channel();
        let handle = Writer::new(&path, config.columns).spawn(receiver)?;

        let label = host.add_label(window, &depth_text(0));
        host.set_position(label, LABEL_POSITION.0, LABEL_POSITION.1);

        info!(
            car = %car_name,
            track = %track_name,
            path = %path.display(),
            new_file = created,
            speed_unit = ?config.speed_unit,
            "Session started"
        );

        Ok(Self {
            sampler: Sampler::new(config.car_index, config.speed_unit, config.columns),
            sender,
            writer: Some(handle),
            label,
            path,
            frames: 0,
        })
    }

    /// Per-frame callback stamped with the current wall-clock time.
    pub fn update<H>(&mut self, host: &mut H, delta: f64) -> Result<FrameOutcome>
    where
        H: TelemetrySource + StatusDisplay + ?Sized,
    {
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs_f64();
        trace!(delta, "Frame");
        self.update_at(host, now)
    }

    /// Per-frame callback with an explicit sample timestamp.
    ///
    /// Pushes at most one sample, then refreshes the depth label. A query
    /// failure returns early and leaves both the filter and label as they were.
    pub fn update_at<H>(&mut self, host: &mut H, timestamp: f64) -> Result<FrameOutcome>
    where
        H: TelemetrySource + StatusDisplay + ?Sized,
    {
        self.frames += 1;
        let outcome = match self.sampler.capture(host, timestamp)? {
            Some(sample) => {
                self.sender.push(sample)?;
                FrameOutcome::Queued
            }
            None => FrameOutcome::Skipped,
        };

        host.set_text(self.label, &depth_text(self.sender.depth()));
        Ok(outcome)
    }

    /// Messages waiting for the writer
    pub fn queue_depth(&self) -> usize {
        self.sender.depth()
    }

    /// Session file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Frames seen by [`update`](Self::update), including failed ones
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Whether the writer thread has exited early
    pub fn writer_stopped(&self) -> bool {
        self.writer.as_ref().is_none_or(WriterHandle::is_finished)
    }

    /// Send one terminate message and wait for the writer to drain.
    ///
    /// Blocks without a timeout. Returns the writer's own error if it died
    /// earlier.
    pub fn shutdown(mut self) -> Result<WriterReport> {
        self.finish()
    }

    fn finish(&mut self) -> Result<WriterReport> {
        let handle = self.writer.take().ok_or(DumpError::WriterStopped)?;
        if let Err(e) = self.sender.terminate() {
            debug!("Terminate not delivered ({}), collecting writer result", e);
        }
        let report = handle.join()?;
        info!(
            path = %report.path.display(),
            rows = report.rows_written,
            frames = self.frames,
            "Session shut down"
        );
        Ok(report)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.writer.is_some() {
            debug!("Dropping session without shutdown, draining writer");
            if let Err(e) = self.finish() {
                warn!("Writer ended with error: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ScriptedHost;
    use crate::test_utils::{frames_at, read_rows, started_at};
    use crate::types::ColumnSet;

    fn config_in(dir: &Path) -> Config {
        Config { output_dir: dir.to_path_buf(), ..Config::default() }
    }

    #[test]
    fn start_sets_up_window_label_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ScriptedHost::new(frames_at(&[0.1]));

        let session = Session::start_at(&mut host, &config_in(dir.path()), started_at()).unwrap();
        let expected = dir.path().join("metricdump_ks_mazda_mx5_cup_magione_2024-03-09_14-05-07.csv");
        assert_eq!(session.path(), expected);
        assert_eq!(host.window_title(), Some("ACMetricsDump"));
        assert_eq!(host.label_text(), Some("Buffer size: 0"));

        session.shutdown().unwrap();
        assert_eq!(read_rows(&expected).len(), 1);
    }

    #[test]
    fn frames_are_filtered_and_persisted_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ScriptedHost::new(frames_at(&[0.1, 0.1, 0.2, 0.2, 0.2, 0.1]));
        let mut session =
            Session::start_at(&mut host, &config_in(dir.path()), started_at()).unwrap();

        let mut outcomes = Vec::new();
        let mut timestamp = 100.0;
        while host.step() {
            outcomes.push(session.update_at(&mut host, timestamp).unwrap());
            timestamp += 1.0;
        }
        assert_eq!(
            outcomes,
            vec![
                FrameOutcome::Queued,
                FrameOutcome::Skipped,
                FrameOutcome::Queued,
                FrameOutcome::Skipped,
                FrameOutcome::Skipped,
                FrameOutcome::Queued,
            ]
        );
        assert!(host.label_text().unwrap().starts_with("Buffer size: "));

        let path = session.path().to_path_buf();
        let report = session.shutdown().unwrap();
        assert_eq!(report.rows_written, 3);

        let rows = read_rows(&path);
        let timestamps: Vec<&str> = rows[1..].iter().map(|r| r[0].as_str()).collect();
        assert_eq!(timestamps, vec!["100.0", "102.0", "105.0"]);
    }

    #[test]
    fn query_failure_skips_label_update() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ScriptedHost::new(frames_at(&[0.1, 0.2]));
        let mut session =
            Session::start_at(&mut host, &config_in(dir.path()), started_at()).unwrap();

        host.step();
        host.fail_on(crate::types::CarStateField::Gear);
        host.set_label_text("sentinel");
        assert!(session.update_at(&mut host, 1.0).is_err());
        assert_eq!(host.label_text(), Some("sentinel"));
        assert_eq!(session.frames(), 1);

        host.clear_failure();
        host.step();
        assert_eq!(session.update_at(&mut host, 2.0).unwrap(), FrameOutcome::Queued);
        assert_eq!(session.shutdown().unwrap().rows_written, 1);
    }

    #[test]
    fn dropping_a_session_still_drains_the_writer() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ScriptedHost::new(frames_at(&[0.1, 0.2, 0.3]));
        let mut session =
            Session::start_at(&mut host, &config_in(dir.path()), started_at()).unwrap();
        while host.step() {
            session.update_at(&mut host, 0.0).unwrap();
        }
        let path = session.path().to_path_buf();
        drop(session);

        assert_eq!(read_rows(&path).len(), 4);
    }

    #[test]
    fn writer_failure_stops_pushes_and_surfaces_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let blocked = dir.path().join("metricdump_ks_mazda_mx5_cup_magione_2024-03-09_14-05-07.csv");
        // a directory at the file path passes header preparation but fails the append open
        std::fs::create_dir(&blocked).unwrap();

        let mut host = ScriptedHost::new(frames_at(&[0.1, 0.2, 0.3]));
        let mut session =
            Session::start_at(&mut host, &config_in(dir.path()), started_at()).unwrap();
        for _ in 0..500 {
            if session.writer_stopped() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(session.writer_stopped());

        while host.step() {
            let err = session.update_at(&mut host, 0.0).unwrap_err();
            assert!(matches!(err, DumpError::WriterStopped), "{err}");
        }
        assert_eq!(session.queue_depth(), 0);

        let err = session.shutdown().unwrap_err();
        assert!(matches!(err, DumpError::File { ref path, .. } if *path == blocked), "{err}");
    }

    #[test]
    fn extended_columns_widen_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config { columns: ColumnSet::Extended, ..config_in(dir.path()) };
        let mut host = ScriptedHost::new(frames_at(&[0.1, 0.2]));
        let mut session = Session::start_at(&mut host, &config, started_at()).unwrap();
        while host.step() {
            session.update_at(&mut host, 0.0).unwrap();
        }
        let path = session.path().to_path_buf();
        session.shutdown().unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.len() == 22));
        assert_eq!(rows[1][6], "(80.0, 80.5, 78.0, 78.5)");
    }
}

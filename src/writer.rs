//! Session file naming and the background CSV writer

use chrono::NaiveDateTime;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::queue::{Message, SampleReceiver};
use crate::types::ColumnSet;
use crate::{DumpError, Result};

/// Prefix of every session file
pub const FILE_PREFIX: &str = "metricdump";

/// `strftime` layout of the session start time in file names
pub const START_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

const WRITER_THREAD_NAME: &str = "metricdump-writer";

/// `metricdump_<car>_<track>_<YYYY-MM-DD_HH-MM-SS>.csv`
pub fn session_file_name(car_name: &str, track_name: &str, started_at: &NaiveDateTime) -> String {
    format!(
        "{FILE_PREFIX}_{car_name}_{track_name}_{}.csv",
        started_at.format(START_TIME_FORMAT)
    )
}

/// Create the session file with a header row unless it already exists.
///
/// Returns `true` when the file was created. An existing file is left
/// untouched, so re-running against the same path never duplicates the header.
pub fn prepare_session_file(path: &Path, columns: ColumnSet) -> Result<bool> {
    let file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            debug!(path = %path.display(), "Session file exists, appending");
            return Ok(false);
        }
        Err(e) => return Err(DumpError::file_error(path, e)),
    };

    let mut csv = csv_writer(file);
    csv.write_record(columns.header()).map_err(|e| DumpError::csv_error(path, e))?;
    csv.flush().map_err(|e| DumpError::file_error(path, e))?;
    debug!(path = %path.display(), columns = columns.len(), "Created session file with header");
    Ok(true)
}

fn csv_writer(file: File) -> csv::Writer<File> {
    csv::WriterBuilder::new().has_headers(false).from_writer(file)
}

/// Outcome of a writer thread that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterReport {
    /// File the rows went to
    pub path: PathBuf,
    /// Rows appended by this writer, header excluded
    pub rows_written: u64,
    /// `false` when the channel closed without a terminate message
    pub terminated: bool,
}

/// Background writer appending one row per received sample.
pub struct Writer {
    path: PathBuf,
    columns: ColumnSet,
}

impl Writer {
    pub fn new(path: impl Into<PathBuf>, columns: ColumnSet) -> Self {
        Self { path: path.into(), columns }
    }

    /// Run the writer on its own thread until it sees [`Message::Terminate`].
    pub fn spawn(self, receiver: SampleReceiver) -> Result<WriterHandle> {
        let path = self.path.clone();
        let thread = std::thread::Builder::new()
            .name(WRITER_THREAD_NAME.to_string())
            .spawn(move || self.run(receiver))
            .map_err(|e| DumpError::Task { details: format!("spawning writer thread: {e}") })?;
        Ok(WriterHandle { thread, path })
    }

    /// Drain `receiver` into the file on the current thread.
    ///
    /// Blocks until the channel ends. Must not be called from inside an async
    /// context; use [`spawn`](Self::spawn) or `tokio::task::spawn_blocking`
    /// there.
    pub fn run(self, mut receiver: SampleReceiver) -> Result<WriterReport> {
        info!(path = %self.path.display(), "Writer started");

        let result = self.drain(&mut receiver);
        match &result {
            Ok(report) => info!(
                path = %report.path.display(),
                rows = report.rows_written,
                "Writer finished"
            ),
            Err(e) => error!(path = %self.path.display(), "Writer failed: {}", e),
        }
        result
    }

    fn drain(&self, receiver: &mut SampleReceiver) -> Result<WriterReport> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| DumpError::file_error(&self.path, e))?;
        let mut csv = csv_writer(file);

        let mut rows_written = 0u64;
        let terminated = loop {
            match receiver.blocking_next() {
                Some(Message::Sample(sample)) => {
                    csv.write_record(sample.record(self.columns))
                        .map_err(|e| DumpError::csv_error(&self.path, e))?;
                    rows_written += 1;
                }
                Some(Message::Terminate) => break true,
                None => {
                    warn!("Sample channel closed without terminate message");
                    break false;
                }
            }
        };

        csv.flush().map_err(|e| DumpError::file_error(&self.path, e))?;
        Ok(WriterReport { path: self.path.clone(), rows_written, terminated })
    }
}

/// Join handle of a running writer thread.
#[derive(Debug)]
pub struct WriterHandle {
    thread: JoinHandle<Result<WriterReport>>,
    path: PathBuf,
}

impl WriterHandle {
    /// File the writer appends to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the thread has exited, successfully or not
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Block until the thread exits. No timeout is applied.
    pub fn join(self) -> Result<WriterReport> {
        self.thread.join().map_err(|_| DumpError::WriterPanicked)?
    }
}

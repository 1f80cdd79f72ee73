//! Per-frame telemetry capture into CSV session files.
//!
//! metricdump samples car state from a racing-simulator host once per frame,
//! drops frames where the car has not moved along the track, and hands the
//! rest to a background writer that appends them to one CSV file per
//! car/track/start-time session.
//!
//! # Features
//!
//! - **Non-blocking capture**: the frame callback never waits on disk I/O
//! - **Spline de-duplication**: stationary frames produce no rows
//! - **Lossless shutdown**: every queued sample is written before the writer exits
//! - **Replay**: re-drive a recorded session file through the same pipeline
//!
//! # Quick Start
//!
//! A host embeds a [`Session`] directly and calls it from its own callbacks:
//!
//! ```rust,no_run
//! use metricdump::{Config, Host, Session};
//!
//! fn run<H: Host>(host: &mut H) -> metricdump::Result<()> {
//!     let config = Config::default();
//!     let mut session = Session::start(host, &config)?;
//!     // once per rendered frame
//!     session.update(host, 1.0 / 60.0)?;
//!     // on unload
//!     let report = session.shutdown()?;
//!     println!("{} rows in {}", report.rows_written, report.path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Example (replay)
//!
//! ```rust,no_run
//! use metricdump::{Config, MetricDump, ReplayOptions};
//!
//! #[tokio::main]
//! async fn main() -> metricdump::Result<()> {
//!     let handle = MetricDump::replay("lap.csv", ReplayOptions::default(), Config::default()).await?;
//!     let report = handle.join().await?;
//!     println!("{} of {} frames written", report.queued, report.frames);
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
pub mod repr;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Capture pipeline
pub mod config;
pub mod host;
pub mod queue;
pub mod sampler;
pub mod session;
pub mod writer;

// Frame-driven execution
pub mod driver;
pub mod provider;
pub mod providers;

// Core exports
pub use error::*;
pub use types::*;

// Pipeline exports
pub use config::{Config, LoggingConfig};
pub use driver::{DriverHandle, DriverReport, FrameDriver};
pub use host::{Host, LabelId, SessionIdentity, StatusDisplay, TelemetrySource, WindowId};
pub use provider::FrameSource;
pub use providers::{ReplayHost, ReplayOptions, ScriptedHost};
pub use queue::{Message, SampleReceiver, SampleSender, sample_channel};
pub use sampler::{Sampler, SplineFilter};
pub use session::{FrameOutcome, Session};
pub use writer::{Writer, WriterHandle, WriterReport};

/// Entry point for running sessions on a tokio runtime.
///
/// # Examples
///
/// ```rust,no_run
/// use metricdump::{Config, MetricDump, ScriptedHost};
///
/// # #[tokio::main]
/// # async fn main() -> metricdump::Result<()> {
/// let host = ScriptedHost::new(Vec::new());
/// let report = MetricDump::start(host, Config::default()).join().await?;
/// # Ok(())
/// # }
/// ```
pub struct MetricDump;

impl MetricDump {
    /// Run a session against any host that can advance its own frames.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start<H>(host: H, config: Config) -> DriverHandle
    where
        H: Host + FrameSource,
    {
        FrameDriver::spawn(host, config)
    }

    /// Replay a recorded session file.
    ///
    /// The recording is loaded off the runtime; the replayed session writes a
    /// new file under `config.output_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the recording cannot be read or its header names an
    /// unknown column.
    pub async fn replay<P: AsRef<std::path::Path>>(
        path: P,
        options: ReplayOptions,
        config: Config,
    ) -> Result<DriverHandle> {
        let path = path.as_ref().to_path_buf();
        let host = tokio::task::spawn_blocking(move || ReplayHost::open(path, options))
            .await
            .map_err(|e| DumpError::Task { details: e.to_string() })??;
        Ok(Self::start(host, config))
    }
}

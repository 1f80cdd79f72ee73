//! Replay host for previously recorded session files

use anyhow::{Context, anyhow, bail};
use std::path::Path;
use tokio::time::{Duration, Interval, MissedTickBehavior, interval};
use tracing::{debug, info, trace};

use super::state_from_sample;
use crate::host::{LabelId, SessionIdentity, StatusDisplay, TelemetrySource, WindowId};
use crate::provider::FrameSource;
use crate::repr::parse_tuple;
use crate::types::{CarStateField, Column, Sample, SpeedUnit, StateValue, WheelState};
use crate::{DumpError, Result};

/// How a recorded file is played back
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOptions {
    /// Car name reported to the session (file names are not parsed back)
    pub car_name: String,
    /// Track name reported to the session
    pub track_name: String,
    /// Unit the file's speed column was recorded in
    pub recorded_unit: SpeedUnit,
    /// Frames per second at 1x playback
    pub tick_rate: f64,
    /// Playback speed multiplier, clamped to `[0.1, 10.0]`
    pub speed: f64,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            car_name: "replay".to_string(),
            track_name: "replay".to_string(),
            recorded_unit: SpeedUnit::Kmh,
            tick_rate: 60.0,
            speed: 1.0,
        }
    }
}

/// Host that replays the rows of a metricdump CSV as frames.
///
/// Every row becomes one frame, so feeding a recording back through a session
/// yields the same rows (apart from timestamps, which are re-sampled).
pub struct ReplayHost {
    frames: Vec<Sample>,
    cursor: Option<usize>,
    options: ReplayOptions,
    /// Time between frames at the current speed
    period: Duration,
    /// Created on first advance; needs a running tokio runtime
    interval: Option<Interval>,
    label_text: Option<String>,
}

impl ReplayHost {
    /// Load every row of `path`.
    pub fn open<P: AsRef<Path>>(path: P, options: ReplayOptions) -> Result<Self> {
        let path = path.as_ref();
        let frames = load_frames(path).map_err(|e| match e.downcast::<csv::Error>() {
            Ok(csv_err) => DumpError::csv_error(path, csv_err),
            Err(e) => DumpError::parse_error(format!("replay of {}", path.display()), format!("{e:#}")),
        })?;

        let mut options = options;
        options.speed = clamp_speed(options.speed)?;
        let period = frame_period(options.tick_rate, options.speed)?;

        info!(
            path = %path.display(),
            frames = frames.len(),
            tick_rate = options.tick_rate,
            speed = options.speed,
            "Opened replay file"
        );

        Ok(Self { frames, cursor: None, options, period, interval: None, label_text: None })
    }

    fn pacing(period: Duration) -> Interval {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }

    /// Change playback speed. The previous speed is kept on error.
    pub fn set_speed(&mut self, speed: f64) -> Result<()> {
        let speed = clamp_speed(speed)?;
        self.period = frame_period(self.options.tick_rate, speed)?;
        self.options.speed = speed;
        self.interval = None;
        debug!("Playback speed set to {}x", self.options.speed);
        Ok(())
    }

    /// Total frames in the file
    pub fn total_frames(&self) -> usize {
        self.frames.len()
    }

    /// Index of the current frame, if one is loaded
    pub fn current_frame(&self) -> Option<usize> {
        self.cursor
    }

    /// Recorded duration in seconds at 1x
    pub fn duration(&self) -> f64 {
        self.frames.len() as f64 / self.options.tick_rate
    }

    /// Last text the session put on the status label
    pub fn label_text(&self) -> Option<&str> {
        self.label_text.as_deref()
    }
}

impl TelemetrySource for ReplayHost {
    fn car_state(&self, _car_index: u32, field: CarStateField) -> Result<StateValue> {
        let frame = self
            .cursor
            .and_then(|i| self.frames.get(i))
            .ok_or_else(|| DumpError::telemetry_failed(field.host_name(), "no current frame"))?;
        state_from_sample(frame, field, self.options.recorded_unit)
            .ok_or_else(|| DumpError::telemetry_failed(field.host_name(), "not recorded in file"))
    }
}

impl SessionIdentity for ReplayHost {
    fn car_name(&self, _car_index: u32) -> Result<String> {
        Ok(self.options.car_name.clone())
    }

    fn track_name(&self, _car_index: u32) -> Result<String> {
        Ok(self.options.track_name.clone())
    }
}

impl StatusDisplay for ReplayHost {
    fn new_app(&mut self, name: &str) -> WindowId {
        debug!(name, "Headless replay window");
        WindowId(0)
    }

    fn set_size(&mut self, _window: WindowId, _width: f32, _height: f32) {}

    fn add_label(&mut self, _window: WindowId, text: &str) -> LabelId {
        self.label_text = Some(text.to_string());
        LabelId(0)
    }

    fn set_position(&mut self, _label: LabelId, _x: f32, _y: f32) {}

    fn set_text(&mut self, _label: LabelId, text: &str) {
        self.label_text = Some(text.to_string());
    }
}

#[async_trait::async_trait]
impl FrameSource for ReplayHost {
    async fn advance(&mut self) -> Result<bool> {
        let next = self.cursor.map_or(0, |i| i + 1);
        if next >= self.frames.len() {
            debug!("Reached end of replay");
            return Ok(false);
        }

        let period = self.period;
        self.interval.get_or_insert_with(|| Self::pacing(period)).tick().await;
        self.cursor = Some(next);
        trace!("Frame {}/{}", next + 1, self.frames.len());
        Ok(true)
    }

    fn tick_rate(&self) -> f64 {
        self.options.tick_rate * self.options.speed
    }
}

fn clamp_speed(speed: f64) -> Result<f64> {
    if speed.is_nan() {
        return Err(DumpError::Config { reason: "replay speed must be a number".to_string() });
    }
    Ok(speed.clamp(0.1, 10.0))
}

/// Interval between frames; never zero, which `tokio::time::interval` rejects.
fn frame_period(tick_rate: f64, speed: f64) -> Result<Duration> {
    if !(tick_rate.is_finite() && tick_rate > 0.0) {
        return Err(DumpError::Config {
            reason: format!("replay tick rate must be positive, got {tick_rate}"),
        });
    }
    match Duration::try_from_secs_f64(1.0 / (tick_rate * speed)) {
        Ok(period) if !period.is_zero() => Ok(period),
        _ => Err(DumpError::Config {
            reason: format!("replay tick rate {tick_rate} at {speed}x is too fast to pace"),
        }),
    }
}

/// Read a session file into snapshots, mapping columns by header name.
fn load_frames(path: &Path) -> anyhow::Result<Vec<Sample>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;

    let header = reader.headers()?.clone();
    let columns: Vec<Column> = header
        .iter()
        .map(|name| Column::from_name(name).ok_or_else(|| anyhow!("unknown column '{name}'")))
        .collect::<anyhow::Result<_>>()?;
    if !columns.contains(&Column::NormalizedSplinePosition) {
        bail!("missing column 'normalized_spline_position'");
    }

    let mut frames = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        // header is line 1
        let line = index + 2;
        let mut sample = Sample::default();
        for (column, text) in columns.iter().zip(record.iter()) {
            apply(&mut sample, *column, text)
                .with_context(|| format!("line {line}, column '{column}'"))?;
        }
        frames.push(sample);
    }
    Ok(frames)
}

fn apply(sample: &mut Sample, column: Column, text: &str) -> anyhow::Result<()> {
    let float = || text.trim().parse::<f64>().with_context(|| format!("'{text}' is not a float"));
    let int = || text.trim().parse::<i64>().with_context(|| format!("'{text}' is not an integer"));
    let vector = |width: usize| -> anyhow::Result<Vec<f64>> {
        let values = parse_tuple(text).ok_or_else(|| anyhow!("'{text}' is not a tuple"))?;
        if values.len() != width {
            bail!("expected {width} components, found {}", values.len());
        }
        Ok(values)
    };
    let vec3 = || -> anyhow::Result<[f64; 3]> {
        let v = vector(3)?;
        Ok([v[0], v[1], v[2]])
    };
    let wheel = |sample: &mut Sample, pick: fn(&mut WheelState) -> &mut [f64; 4]| -> anyhow::Result<()> {
        // standard-set recordings leave wheel columns out entirely
        if text.trim().is_empty() {
            return Ok(());
        }
        let v = vector(4)?;
        *pick(sample.wheels.get_or_insert_with(WheelState::default)) = [v[0], v[1], v[2], v[3]];
        Ok(())
    };

    match column {
        Column::Timestamp => sample.timestamp = float()?,
        Column::Speed => sample.speed = float()?,
        Column::Rpm => sample.rpm = float()?,
        Column::Gear => sample.gear = int()?,
        Column::LocalVelocity => sample.local_velocity = vec3()?,
        Column::LocalAngularVelocity => sample.local_angular_velocity = vec3()?,
        Column::ThermalState => wheel(sample, |w| &mut w.thermal_state)?,
        Column::DynamicPressure => wheel(sample, |w| &mut w.dynamic_pressure)?,
        Column::TyreLoadedRadius => wheel(sample, |w| &mut w.tyre_loaded_radius)?,
        Column::SuspensionTravel => wheel(sample, |w| &mut w.suspension_travel)?,
        Column::TyreDirtyLevel => wheel(sample, |w| &mut w.tyre_dirty_level)?,
        Column::SlipAngle => wheel(sample, |w| &mut w.slip_angle)?,
        Column::Gas => sample.gas = float()?,
        Column::Brake => sample.brake = float()?,
        Column::Clutch => sample.clutch = float()?,
        Column::LastFf => sample.last_ff = float()?,
        Column::Steer => sample.steer = float()?,
        Column::LapCount => sample.lap_count = int()?,
        Column::LapInvalidated => sample.lap_invalidated = int()?,
        Column::LapTime => sample.lap_time = float()?,
        Column::NormalizedSplinePosition => sample.normalized_spline_position = float()?,
        Column::PerformanceMeter => sample.performance_meter = float()?,
    }
    Ok(())
}

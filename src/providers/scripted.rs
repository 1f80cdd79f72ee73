//! In-memory host driven by a fixed list of snapshots

use tracing::trace;

use super::state_from_sample;
use crate::host::{LabelId, SessionIdentity, StatusDisplay, TelemetrySource, WindowId};
use crate::provider::FrameSource;
use crate::types::{CarStateField, Sample, SpeedUnit, StateValue};
use crate::{DumpError, Result};

/// Host that plays back prepared snapshots, one per frame.
///
/// Snapshot speeds are in km/h. Nothing is current until the first
/// [`step`](Self::step). Queries for the field set with
/// [`fail_on`](Self::fail_on) return a telemetry error, which lets callers
/// exercise the frame-failure path.
#[derive(Debug, Clone)]
pub struct ScriptedHost {
    frames: Vec<Sample>,
    cursor: Option<usize>,
    car_name: String,
    track_name: String,
    failing: Option<CarStateField>,
    repeat: bool,
    window_title: Option<String>,
    label_text: Option<String>,
    tick_rate: f64,
}

impl ScriptedHost {
    pub fn new(frames: Vec<Sample>) -> Self {
        Self {
            frames,
            cursor: None,
            car_name: "ks_mazda_mx5_cup".to_string(),
            track_name: "magione".to_string(),
            failing: None,
            repeat: false,
            window_title: None,
            label_text: None,
            tick_rate: 60.0,
        }
    }

    /// Override the car and track reported to the session
    pub fn with_identity(mut self, car_name: impl Into<String>, track_name: impl Into<String>) -> Self {
        self.car_name = car_name.into();
        self.track_name = track_name.into();
        self
    }

    /// Start over from the first snapshot instead of ending the script
    pub fn repeating(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Move to the next snapshot; `false` once the script is exhausted
    pub fn step(&mut self) -> bool {
        let mut next = self.cursor.map_or(0, |i| i + 1);
        if next >= self.frames.len() && self.repeat {
            next = 0;
        }
        if next < self.frames.len() {
            self.cursor = Some(next);
            true
        } else {
            false
        }
    }

    /// Make queries for `field` fail until [`clear_failure`](Self::clear_failure)
    pub fn fail_on(&mut self, field: CarStateField) {
        self.failing = Some(field);
    }

    pub fn clear_failure(&mut self) {
        self.failing = None;
    }

    /// Title of the window the session created
    pub fn window_title(&self) -> Option<&str> {
        self.window_title.as_deref()
    }

    /// Current status label text
    pub fn label_text(&self) -> Option<&str> {
        self.label_text.as_deref()
    }

    /// Overwrite the recorded label text
    pub fn set_label_text(&mut self, text: impl Into<String>) {
        self.label_text = Some(text.into());
    }

    fn current(&self) -> Option<&Sample> {
        self.cursor.and_then(|i| self.frames.get(i))
    }
}

impl TelemetrySource for ScriptedHost {
    fn car_state(&self, _car_index: u32, field: CarStateField) -> Result<StateValue> {
        if self.failing == Some(field) {
            return Err(DumpError::telemetry_failed(field.host_name(), "injected failure"));
        }
        let frame = self
            .current()
            .ok_or_else(|| DumpError::telemetry_failed(field.host_name(), "no current frame"))?;
        state_from_sample(frame, field, SpeedUnit::Kmh)
            .ok_or_else(|| DumpError::telemetry_failed(field.host_name(), "not in snapshot"))
    }
}

impl SessionIdentity for ScriptedHost {
    fn car_name(&self, _car_index: u32) -> Result<String> {
        Ok(self.car_name.clone())
    }

    fn track_name(&self, _car_index: u32) -> Result<String> {
        Ok(self.track_name.clone())
    }
}

impl StatusDisplay for ScriptedHost {
    fn new_app(&mut self, name: &str) -> WindowId {
        self.window_title = Some(name.to_string());
        WindowId(1)
    }

    fn set_size(&mut self, _window: WindowId, _width: f32, _height: f32) {}

    fn add_label(&mut self, _window: WindowId, text: &str) -> LabelId {
        self.label_text = Some(text.to_string());
        LabelId(1)
    }

    fn set_position(&mut self, _label: LabelId, _x: f32, _y: f32) {}

    fn set_text(&mut self, _label: LabelId, text: &str) {
        trace!(text, "Label updated");
        self.label_text = Some(text.to_string());
    }
}

#[async_trait::async_trait]
impl FrameSource for ScriptedHost {
    async fn advance(&mut self) -> Result<bool> {
        // Unpaced; yield so cancellation can be observed between frames
        tokio::task::yield_now().await;
        Ok(self.step())
    }

    fn tick_rate(&self) -> f64 {
        self.tick_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::frames_at;

    #[test]
    fn nothing_is_current_before_first_step() {
        let host = ScriptedHost::new(frames_at(&[0.1]));
        let err = host.car_state(0, CarStateField::Rpm).unwrap_err();
        assert!(err.to_string().contains("no current frame"));
    }

    #[test]
    fn steps_through_every_frame_once() {
        let mut host = ScriptedHost::new(frames_at(&[0.1, 0.2]));
        assert!(host.step());
        assert!(host.step());
        assert!(!host.step());
        let spline = host.car_state(0, CarStateField::NormalizedSplinePosition).unwrap();
        assert_eq!(spline, StateValue::Float(0.2));
    }

    #[test]
    fn repeating_script_wraps_around() {
        let mut host = ScriptedHost::new(frames_at(&[0.1, 0.2])).repeating();
        for _ in 0..5 {
            assert!(host.step());
        }
        let spline = host.car_state(0, CarStateField::NormalizedSplinePosition).unwrap();
        assert_eq!(spline, StateValue::Float(0.1));

        let mut empty = ScriptedHost::new(Vec::new()).repeating();
        assert!(!empty.step());
    }

    #[test]
    fn wheel_fields_fail_without_wheel_state() {
        let mut frame = crate::test_utils::frame_at(0.1);
        frame.wheels = None;
        let mut host = ScriptedHost::new(vec![frame]);
        host.step();
        assert!(host.car_state(0, CarStateField::SlipAngle).is_err());
    }

    #[tokio::test]
    async fn advance_reports_end_of_script() {
        let mut host = ScriptedHost::new(frames_at(&[0.1]));
        assert!(host.advance().await.unwrap());
        assert!(!host.advance().await.unwrap());
    }
}

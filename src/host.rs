//! Interfaces the host simulator provides
//!
//! The simulator is an external collaborator: it answers car-state queries,
//! names the current car and track, and owns the UI the status label lives in.
//! Each concern is its own trait so test doubles only implement what a code
//! path needs.

use crate::Result;
use crate::types::{CarStateField, StateValue};

/// Synchronous car-state query interface.
pub trait TelemetrySource {
    /// Current value of `field` for the car at `car_index` (0 is the player).
    ///
    /// A failure aborts the frame being sampled.
    fn car_state(&self, car_index: u32, field: CarStateField) -> Result<StateValue>;
}

/// Car and track identity, used only for file naming.
pub trait SessionIdentity {
    fn car_name(&self, car_index: u32) -> Result<String>;

    fn track_name(&self, car_index: u32) -> Result<String>;
}

/// Handle of a host app window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u32);

/// Handle of a text label inside a host window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelId(pub u32);

/// The slice of the host UI used to show the live queue depth.
pub trait StatusDisplay {
    fn new_app(&mut self, name: &str) -> WindowId;

    fn set_size(&mut self, window: WindowId, width: f32, height: f32);

    fn add_label(&mut self, window: WindowId, text: &str) -> LabelId;

    fn set_position(&mut self, label: LabelId, x: f32, y: f32);

    fn set_text(&mut self, label: LabelId, text: &str);
}

/// Everything a session needs from the host.
pub trait Host: TelemetrySource + SessionIdentity + StatusDisplay {}

impl<T: TelemetrySource + SessionIdentity + StatusDisplay + ?Sized> Host for T {}

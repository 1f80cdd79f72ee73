//! Captured telemetry sample

use super::{Column, ColumnSet};
use crate::repr::{repr_f64, repr_tuple};

/// Three-component vector in the car's local frame
pub type Vec3 = [f64; 3];

/// One value per wheel: front-left, front-right, rear-left, rear-right
pub type WheelValues = [f64; 4];

/// Per-wheel tyre and suspension state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelState {
    pub thermal_state: WheelValues,
    pub dynamic_pressure: WheelValues,
    pub tyre_loaded_radius: WheelValues,
    pub suspension_travel: WheelValues,
    pub tyre_dirty_level: WheelValues,
    pub slip_angle: WheelValues,
}

/// Telemetry captured for one accepted frame.
///
/// Created by the sampler, moved through the channel and dropped once the
/// writer has persisted it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sample {
    /// Wall-clock seconds since the Unix epoch
    pub timestamp: f64,
    /// Speed in the session's configured unit
    pub speed: f64,
    pub rpm: f64,
    pub gear: i64,
    pub local_velocity: Vec3,
    pub local_angular_velocity: Vec3,
    /// Present only when the session persists the extended column set
    pub wheels: Option<WheelState>,
    pub gas: f64,
    pub brake: f64,
    pub clutch: f64,
    pub last_ff: f64,
    pub steer: f64,
    pub lap_count: i64,
    pub lap_invalidated: i64,
    pub lap_time: f64,
    /// Already truncated through its text form
    pub normalized_spline_position: f64,
    pub performance_meter: f64,
}

impl Sample {
    /// Render one column in the host's text form.
    ///
    /// Wheel columns render empty when the sample carries no wheel state.
    pub fn render(&self, column: Column) -> String {
        let wheel = |pick: fn(&WheelState) -> &WheelValues| {
            self.wheels.as_ref().map(|w| repr_tuple(pick(w))).unwrap_or_default()
        };

        match column {
            Column::Timestamp => repr_f64(self.timestamp),
            Column::Speed => repr_f64(self.speed),
            Column::Rpm => repr_f64(self.rpm),
            Column::Gear => self.gear.to_string(),
            Column::LocalVelocity => repr_tuple(&self.local_velocity),
            Column::LocalAngularVelocity => repr_tuple(&self.local_angular_velocity),
            Column::ThermalState => wheel(|w| &w.thermal_state),
            Column::DynamicPressure => wheel(|w| &w.dynamic_pressure),
            Column::TyreLoadedRadius => wheel(|w| &w.tyre_loaded_radius),
            Column::SuspensionTravel => wheel(|w| &w.suspension_travel),
            Column::TyreDirtyLevel => wheel(|w| &w.tyre_dirty_level),
            Column::SlipAngle => wheel(|w| &w.slip_angle),
            Column::Gas => repr_f64(self.gas),
            Column::Brake => repr_f64(self.brake),
            Column::Clutch => repr_f64(self.clutch),
            Column::LastFf => repr_f64(self.last_ff),
            Column::Steer => repr_f64(self.steer),
            Column::LapCount => self.lap_count.to_string(),
            Column::LapInvalidated => self.lap_invalidated.to_string(),
            Column::LapTime => repr_f64(self.lap_time),
            Column::NormalizedSplinePosition => repr_f64(self.normalized_spline_position),
            Column::PerformanceMeter => repr_f64(self.performance_meter),
        }
    }

    /// Render a full row for the given column set
    pub fn record(&self, columns: ColumnSet) -> Vec<String> {
        columns.columns().iter().map(|column| self.render(*column)).collect()
    }
}

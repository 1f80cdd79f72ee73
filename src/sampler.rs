//! Per-frame telemetry sampling and spline de-duplication

use tracing::trace;

use crate::Result;
use crate::host::TelemetrySource;
use crate::repr::{SPLINE_REPR_WIDTH, truncate_repr};
use crate::types::{CarStateField, ColumnSet, Sample, SpeedUnit, WheelState};

/// Drops frames whose truncated spline position did not move.
///
/// Starts with nothing seen, so the first observation is always accepted.
#[derive(Debug, Clone, Default)]
pub struct SplineFilter {
    last: Option<f64>,
}

impl SplineFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `position` and report whether it differs from the previous one.
    ///
    /// The retained value is replaced whether or not the position changed.
    /// NaN never compares equal and is therefore always accepted.
    pub fn observe(&mut self, position: f64) -> bool {
        let changed = self.last != Some(position);
        self.last = Some(position);
        changed
    }

    /// Last observed position
    pub fn last(&self) -> Option<f64> {
        self.last
    }
}

/// Reads one snapshot per frame from the host and filters it.
#[derive(Debug, Clone)]
pub struct Sampler {
    car_index: u32,
    speed_unit: SpeedUnit,
    columns: ColumnSet,
    filter: SplineFilter,
}

impl Sampler {
    pub fn new(car_index: u32, speed_unit: SpeedUnit, columns: ColumnSet) -> Self {
        Self { car_index, speed_unit, columns, filter: SplineFilter::new() }
    }

    /// Spline filter state
    pub fn filter(&self) -> &SplineFilter {
        &self.filter
    }

    /// Read every field, truncate the spline position and apply the filter.
    ///
    /// Returns `Ok(None)` when the frame is a duplicate. Any query error is
    /// returned before the filter is touched.
    pub fn capture<T>(&mut self, host: &T, timestamp: f64) -> Result<Option<Sample>>
    where
        T: TelemetrySource + ?Sized,
    {
        let car = self.car_index;
        let float = |field| host.car_state(car, field).and_then(|v| v.into_f64(field));
        let int = |field| host.car_state(car, field).and_then(|v| v.into_i64(field));
        let vec3 = |field| host.car_state(car, field).and_then(|v| v.into_array::<3>(field));

        let speed = float(self.speed_unit.field())?;
        let rpm = float(CarStateField::Rpm)?;
        let gear = int(CarStateField::Gear)?;
        let local_velocity = vec3(CarStateField::LocalVelocity)?;
        let local_angular_velocity = vec3(CarStateField::LocalAngularVelocity)?;
        let wheels = if self.columns.includes_wheels() { Some(self.wheels(host)?) } else { None };
        let gas = float(CarStateField::Gas)?;
        let brake = float(CarStateField::Brake)?;
        let clutch = float(CarStateField::Clutch)?;
        let last_ff = float(CarStateField::LastFf)?;
        let steer = float(CarStateField::Steer)?;
        let lap_count = int(CarStateField::LapCount)?;
        let lap_invalidated = int(CarStateField::LapInvalidated)?;
        let lap_time = float(CarStateField::LapTime)?;
        let raw_spline = float(CarStateField::NormalizedSplinePosition)?;
        let normalized_spline_position = truncate_repr(raw_spline, SPLINE_REPR_WIDTH)?;
        let performance_meter = float(CarStateField::PerformanceMeter)?;

        let sample = Sample {
            timestamp,
            speed,
            rpm,
            gear,
            local_velocity,
            local_angular_velocity,
            wheels,
            gas,
            brake,
            clutch,
            last_ff,
            steer,
            lap_count,
            lap_invalidated,
            lap_time,
            normalized_spline_position,
            performance_meter,
        };

        if self.filter.observe(normalized_spline_position) {
            Ok(Some(sample))
        } else {
            trace!(spline = normalized_spline_position, "Spline position unchanged, frame skipped");
            Ok(None)
        }
    }

    fn wheels<T>(&self, host: &T) -> Result<WheelState>
    where
        T: TelemetrySource + ?Sized,
    {
        let wheel =
            |field| host.car_state(self.car_index, field).and_then(|v| v.into_array::<4>(field));
        Ok(WheelState {
            thermal_state: wheel(CarStateField::ThermalState)?,
            dynamic_pressure: wheel(CarStateField::DynamicPressure)?,
            tyre_loaded_radius: wheel(CarStateField::TyreLoadedRadius)?,
            suspension_travel: wheel(CarStateField::SuspensionTravel)?,
            tyre_dirty_level: wheel(CarStateField::TyreDirtyLevel)?,
            slip_angle: wheel(CarStateField::SlipAngle)?,
        })
    }
}

//! Host implementations that run without the simulator

pub mod replay;
pub mod scripted;

pub use replay::{ReplayHost, ReplayOptions};
pub use scripted::ScriptedHost;

use crate::types::{CarStateField, Sample, SpeedUnit, StateValue};

/// Answer a car-state query from a recorded snapshot.
///
/// `recorded_unit` is the unit `snapshot.speed` is stored in; speed queries in
/// another unit are converted. Wheel fields are `None` when the snapshot has no
/// wheel state.
pub(crate) fn state_from_sample(
    snapshot: &Sample,
    field: CarStateField,
    recorded_unit: SpeedUnit,
) -> Option<StateValue> {
    let speed = |unit| StateValue::Float(recorded_unit.convert(snapshot.speed, unit));
    let wheels = snapshot.wheels.as_ref();
    let value = match field {
        CarStateField::SpeedKmh => speed(SpeedUnit::Kmh),
        CarStateField::SpeedMs => speed(SpeedUnit::Ms),
        CarStateField::SpeedMph => speed(SpeedUnit::Mph),
        CarStateField::Rpm => snapshot.rpm.into(),
        CarStateField::Gear => snapshot.gear.into(),
        CarStateField::LocalVelocity => snapshot.local_velocity.into(),
        CarStateField::LocalAngularVelocity => snapshot.local_angular_velocity.into(),
        CarStateField::ThermalState => wheels?.thermal_state.into(),
        CarStateField::DynamicPressure => wheels?.dynamic_pressure.into(),
        CarStateField::TyreLoadedRadius => wheels?.tyre_loaded_radius.into(),
        CarStateField::SuspensionTravel => wheels?.suspension_travel.into(),
        CarStateField::TyreDirtyLevel => wheels?.tyre_dirty_level.into(),
        CarStateField::SlipAngle => wheels?.slip_angle.into(),
        CarStateField::Gas => snapshot.gas.into(),
        CarStateField::Brake => snapshot.brake.into(),
        CarStateField::Clutch => snapshot.clutch.into(),
        CarStateField::LastFf => snapshot.last_ff.into(),
        CarStateField::Steer => snapshot.steer.into(),
        CarStateField::LapCount => snapshot.lap_count.into(),
        CarStateField::LapInvalidated => snapshot.lap_invalidated.into(),
        CarStateField::LapTime => snapshot.lap_time.into(),
        CarStateField::NormalizedSplinePosition => snapshot.normalized_spline_position.into(),
        CarStateField::PerformanceMeter => snapshot.performance_meter.into(),
    };
    Some(value)
}

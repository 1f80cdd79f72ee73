//! Car-state fields and the values the host answers with

use std::fmt;

use crate::{DumpError, Result};

/// Car-state fields the sampler queries from the host.
///
/// Names follow the simulator's car-state enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CarStateField {
    SpeedKmh,
    SpeedMs,
    SpeedMph,
    Rpm,
    Gear,
    LocalVelocity,
    LocalAngularVelocity,
    ThermalState,
    DynamicPressure,
    TyreLoadedRadius,
    SuspensionTravel,
    TyreDirtyLevel,
    SlipAngle,
    Gas,
    Brake,
    Clutch,
    LastFf,
    Steer,
    LapCount,
    LapInvalidated,
    LapTime,
    NormalizedSplinePosition,
    PerformanceMeter,
}

impl CarStateField {
    /// Name of the field in the host's car-state enumeration
    pub const fn host_name(self) -> &'static str {
        match self {
            CarStateField::SpeedKmh => "SpeedKMH",
            CarStateField::SpeedMs => "SpeedMS",
            CarStateField::SpeedMph => "SpeedMPH",
            CarStateField::Rpm => "RPM",
            CarStateField::Gear => "Gear",
            CarStateField::LocalVelocity => "LocalVelocity",
            CarStateField::LocalAngularVelocity => "LocalAngularVelocity",
            CarStateField::ThermalState => "ThermalState",
            CarStateField::DynamicPressure => "DynamicPressure",
            CarStateField::TyreLoadedRadius => "TyreLoadedRadius",
            CarStateField::SuspensionTravel => "SuspensionTravel",
            CarStateField::TyreDirtyLevel => "TyreDirtyLevel",
            CarStateField::SlipAngle => "SlipAngle",
            CarStateField::Gas => "Gas",
            CarStateField::Brake => "Brake",
            CarStateField::Clutch => "Clutch",
            CarStateField::LastFf => "LastFF",
            CarStateField::Steer => "Steer",
            CarStateField::LapCount => "LapCount",
            CarStateField::LapInvalidated => "LapInvalidated",
            CarStateField::LapTime => "LapTime",
            CarStateField::NormalizedSplinePosition => "NormalizedSplinePosition",
            CarStateField::PerformanceMeter => "PerformanceMeter",
        }
    }
}

impl fmt::Display for CarStateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host_name())
    }
}

/// Value returned by a car-state query.
#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    Float(f64),
    Int(i64),
    Vector(Vec<f64>),
}

impl StateValue {
    fn kind(&self) -> String {
        match self {
            StateValue::Float(_) => "float".to_string(),
            StateValue::Int(_) => "int".to_string(),
            StateValue::Vector(values) => format!("vector of {}", values.len()),
        }
    }

    fn mismatch(&self, field: CarStateField, expected: &'static str) -> DumpError {
        DumpError::TypeMismatch { field: field.host_name().to_string(), expected, found: self.kind() }
    }

    /// Scalar reading; integers widen to float
    pub fn into_f64(self, field: CarStateField) -> Result<f64> {
        match self {
            StateValue::Float(value) => Ok(value),
            StateValue::Int(value) => Ok(value as f64),
            other => Err(other.mismatch(field, "float")),
        }
    }

    /// Integer reading
    pub fn into_i64(self, field: CarStateField) -> Result<i64> {
        match self {
            StateValue::Int(value) => Ok(value),
            other => Err(other.mismatch(field, "int")),
        }
    }

    /// Fixed-width vector reading
    pub fn into_array<const N: usize>(self, field: CarStateField) -> Result<[f64; N]> {
        match self {
            StateValue::Vector(values) if values.len() == N => {
                let mut out = [0.0; N];
                out.copy_from_slice(&values);
                Ok(out)
            }
            other => {
                let expected = match N {
                    3 => "vector of 3",
                    4 => "vector of 4",
                    _ => "vector",
                };
                Err(other.mismatch(field, expected))
            }
        }
    }
}

impl From<f64> for StateValue {
    fn from(value: f64) -> Self {
        StateValue::Float(value)
    }
}

impl From<i64> for StateValue {
    fn from(value: i64) -> Self {
        StateValue::Int(value)
    }
}

impl<const N: usize> From<[f64; N]> for StateValue {
    fn from(value: [f64; N]) -> Self {
        StateValue::Vector(value.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ints_widen_to_floats() {
        let value = StateValue::Int(7);
        assert_eq!(value.into_f64(CarStateField::Rpm).unwrap(), 7.0);
    }

    #[test]
    fn floats_do_not_narrow_to_ints() {
        let err = StateValue::Float(3.0).into_i64(CarStateField::Gear).unwrap_err();
        assert!(matches!(err, DumpError::TypeMismatch { ref field, .. } if field == "Gear"));
    }

    #[test]
    fn vectors_must_match_width() {
        let ok: [f64; 3] =
            StateValue::from([1.0, 2.0, 3.0]).into_array(CarStateField::LocalVelocity).unwrap();
        assert_eq!(ok, [1.0, 2.0, 3.0]);

        let err = StateValue::from([1.0, 2.0])
            .into_array::<3>(CarStateField::LocalVelocity)
            .unwrap_err();
        assert!(err.to_string().contains("vector of 2"));
    }
}

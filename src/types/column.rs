//! Persisted column layout

use serde::{Deserialize, Serialize};
use std::fmt;

/// One column of the session CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Timestamp,
    Speed,
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

const STANDARD: [Column; 16] = [
    Column::Timestamp,
    Column::Speed,
    Column::Rpm,
    Column::Gear,
    Column::LocalVelocity,
    Column::LocalAngularVelocity,
    Column::Gas,
    Column::Brake,
    Column::Clutch,
    Column::LastFf,
    Column::Steer,
    Column::LapCount,
    Column::LapInvalidated,
    Column::LapTime,
    Column::NormalizedSplinePosition,
    Column::PerformanceMeter,
];

const EXTENDED: [Column; 22] = [
    Column::Timestamp,
    Column::Speed,
    Column::Rpm,
    Column::Gear,
    Column::LocalVelocity,
    Column::LocalAngularVelocity,
    Column::ThermalState,
    Column::DynamicPressure,
    Column::TyreLoadedRadius,
    Column::SuspensionTravel,
    Column::TyreDirtyLevel,
    Column::SlipAngle,
    Column::Gas,
    Column::Brake,
    Column::Clutch,
    Column::LastFf,
    Column::Steer,
    Column::LapCount,
    Column::LapInvalidated,
    Column::LapTime,
    Column::NormalizedSplinePosition,
    Column::PerformanceMeter,
];

impl Column {
    /// Header name
    pub const fn name(self) -> &'static str {
        match self {
            Column::Timestamp => "timestamp",
            Column::Speed => "speed",
            Column::Rpm => "rpm",
            Column::Gear => "gear",
            Column::LocalVelocity => "local_velocity",
            Column::LocalAngularVelocity => "local_angular_velocity",
            Column::ThermalState => "thermal_state",
            Column::DynamicPressure => "dynamic_pressure",
            Column::TyreLoadedRadius => "tyre_loaded_radius",
            Column::SuspensionTravel => "suspension_travel",
            Column::TyreDirtyLevel => "tyre_dirty_level",
            Column::SlipAngle => "slip_angle",
            Column::Gas => "gas",
            Column::Brake => "brake",
            Column::Clutch => "clutch",
            Column::LastFf => "last_ff",
            Column::Steer => "steer",
            Column::LapCount => "lap_count",
            Column::LapInvalidated => "lap_invalidated",
            Column::LapTime => "lap_time",
            Column::NormalizedSplinePosition => "normalized_spline_position",
            Column::PerformanceMeter => "performance_meter",
        }
    }

    /// Look a column up by its header name
    pub fn from_name(name: &str) -> Option<Self> {
        EXTENDED.iter().copied().find(|column| column.name() == name)
    }

    /// Whether this column holds one of the per-wheel vectors
    pub const fn is_wheel(self) -> bool {
        matches!(
            self,
            Column::ThermalState
                | Column::DynamicPressure
                | Column::TyreLoadedRadius
                | Column::SuspensionTravel
                | Column::TyreDirtyLevel
                | Column::SlipAngle
        )
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which columns a session persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnSet {
    /// Scalar, vector, input and lap columns
    #[default]
    Standard,

    /// Standard plus the six per-wheel tyre and suspension vectors
    Extended,
}

impl ColumnSet {
    /// Columns in persisted order
    pub fn columns(self) -> &'static [Column] {
        match self {
            ColumnSet::Standard => &STANDARD,
            ColumnSet::Extended => &EXTENDED,
        }
    }

    /// Header row
    pub fn header(self) -> Vec<&'static str> {
        self.columns().iter().map(|column| column.name()).collect()
    }

    /// Number of fields per row
    pub fn len(self) -> usize {
        self.columns().len()
    }

    pub fn is_empty(self) -> bool {
        self.columns().is_empty()
    }

    /// Whether the per-wheel vectors have to be queried
    pub fn includes_wheels(self) -> bool {
        self.columns().iter().any(|column| column.is_wheel())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_header_order() {
        assert_eq!(
            ColumnSet::Standard.header(),
            vec![
                "timestamp",
                "speed",
                "rpm",
                "gear",
                "local_velocity",
                "local_angular_velocity",
                "gas",
                "brake",
                "clutch",
                "last_ff",
                "steer",
                "lap_count",
                "lap_invalidated",
                "lap_time",
                "normalized_spline_position",
                "performance_meter",
            ]
        );
        assert!(!ColumnSet::Standard.includes_wheels());
    }

    #[test]
    fn extended_inserts_wheels_after_angular_velocity() {
        let header = ColumnSet::Extended.header();
        assert_eq!(header.len(), 22);
        assert_eq!(header[5], "local_angular_velocity");
        assert_eq!(header[6], "thermal_state");
        assert_eq!(header[11], "slip_angle");
        assert_eq!(header[12], "gas");
        assert!(ColumnSet::Extended.includes_wheels());
    }

    #[test]
    fn names_round_trip() {
        for column in ColumnSet::Extended.columns() {
            assert_eq!(Column::from_name(column.name()), Some(*column));
        }
        assert_eq!(Column::from_name("wing_angle"), None);
    }
}

//! Test utilities: snapshot fixtures and session file readers
//!
//! Shared by unit tests and benchmarks so every test drives the pipeline with
//! the same realistic car state.

#![cfg(any(test, feature = "benchmark"))]

use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

use crate::types::{Sample, WheelState};

/// A mid-corner snapshot of a road car at `spline`, speeds in km/h.
pub fn frame_at(spline: f64) -> Sample {
    Sample {
        timestamp: 1_710_000_000.25,
        speed: 123.5,
        rpm: 6250.0,
        gear: 3,
        local_velocity: [1.5, -0.25, 42.0],
        local_angular_velocity: [0.0, 0.375, -0.0625],
        wheels: Some(WheelState {
            thermal_state: [80.0, 80.5, 78.0, 78.5],
            dynamic_pressure: [26.5, 26.25, 25.75, 25.5],
            tyre_loaded_radius: [0.3125, 0.3125, 0.3, 0.3],
            suspension_travel: [0.05, 0.0625, 0.04, 0.045],
            tyre_dirty_level: [0.0, 0.0, 0.5, 0.0],
            slip_angle: [1.25, 1.5, 0.75, 0.5],
        }),
        gas: 0.75,
        brake: 0.0,
        clutch: 1.0,
        last_ff: 0.4375,
        steer: -12.5,
        lap_count: 2,
        lap_invalidated: 0,
        lap_time: 45_210.0,
        normalized_spline_position: spline,
        performance_meter: -0.125,
    }
}

/// One [`frame_at`] snapshot per spline position
pub fn frames_at(positions: &[f64]) -> Vec<Sample> {
    positions.iter().map(|p| frame_at(*p)).collect()
}

/// Fixed session start time: 2024-03-09 14:05:07
pub fn started_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 9)
        .and_then(|d| d.and_hms_opt(14, 5, 7))
        .expect("valid fixture date")
}

/// Every row of a session file, header included
pub fn read_rows<P: AsRef<Path>>(path: P) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path.as_ref())
        .expect("session file should open");
    reader
        .records()
        .map(|r| r.expect("session row should parse").iter().map(str::to_string).collect())
        .collect()
}

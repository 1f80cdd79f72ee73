//! Core types for captured telemetry.
//!
//! - [`Sample`] is one accepted frame, moved from the sampler to the writer
//! - [`Column`] and [`ColumnSet`] fix the persisted field order
//! - [`CarStateField`] and [`StateValue`] describe the host's car-state query
//! - [`SpeedUnit`] selects which speed variant the host is asked for
//!
//! ## Usage Example
//!
//! ```rust
//! use metricdump::types::{ColumnSet, Sample};
//!
//! let sample = Sample { gear: 3, normalized_spline_position: 0.5, ..Sample::default() };
//! let row = sample.record(ColumnSet::Standard);
//! assert_eq!(row.len(), ColumnSet::Standard.len());
//! assert_eq!(row[3], "3");
//! ```

mod column;
mod sample;
mod speed_unit;
mod state;

pub use column::{Column, ColumnSet};
pub use sample::{Sample, Vec3, WheelState, WheelValues};
pub use speed_unit::SpeedUnit;
pub use state::{CarStateField, StateValue};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn arb_sample()(
            timestamp in 0.0f64..2e9,
            speed in -10.0f64..400.0,
            rpm in 0.0f64..20000.0,
            gear in -1i64..8,
            local_velocity in prop::array::uniform3(-100.0f64..100.0),
            local_angular_velocity in prop::array::uniform3(-10.0f64..10.0),
            inputs in prop::array::uniform5(0.0f64..1.0),
            lap_count in 0i64..100,
            lap_invalidated in 0i64..2,
            lap_time in 0.0f64..600000.0,
            normalized_spline_position in 0.0f64..1.0,
            performance_meter in -5.0f64..5.0
        ) -> Sample {
            Sample {
                timestamp,
                speed,
                rpm,
                gear,
                local_velocity,
                local_angular_velocity,
                wheels: None,
                gas: inputs[0],
                brake: inputs[1],
                clutch: inputs[2],
                last_ff: inputs[3],
                steer: inputs[4],
                lap_count,
                lap_invalidated,
                lap_time,
                normalized_spline_position,
                performance_meter,
            }
        }
    }

    proptest! {
        #[test]
        fn records_have_one_field_per_column(sample in arb_sample()) {
            for set in [ColumnSet::Standard, ColumnSet::Extended] {
                let record = sample.record(set);
                prop_assert_eq!(record.len(), set.len());
            }
        }

        #[test]
        fn vector_columns_render_as_one_tuple(sample in arb_sample()) {
            let rendered = sample.render(Column::LocalVelocity);
            prop_assert!(rendered.starts_with('(') && rendered.ends_with(')'));
            prop_assert_eq!(rendered.matches(", ").count(), 2);
        }
    }
}

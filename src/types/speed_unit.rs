//! Speed unit selection for the sampled `speed` column

use serde::{Deserialize, Serialize};

use super::CarStateField;

const KMH_PER_MS: f64 = 3.6;
const MPH_PER_MS: f64 = 2.236_936_292_054_402;

/// Unit the host reports `speed` in.
///
/// Fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeedUnit {
    /// Kilometres per hour
    #[default]
    #[serde(alias = "SpeedKMH")]
    Kmh,

    /// Metres per second
    #[serde(alias = "SpeedMS")]
    Ms,

    /// Miles per hour
    #[serde(alias = "SpeedMPH")]
    Mph,
}

impl SpeedUnit {
    /// Host field that answers speed in this unit
    pub const fn field(self) -> CarStateField {
        match self {
            SpeedUnit::Kmh => CarStateField::SpeedKmh,
            SpeedUnit::Ms => CarStateField::SpeedMs,
            SpeedUnit::Mph => CarStateField::SpeedMph,
        }
    }

    fn per_ms(self) -> f64 {
        match self {
            SpeedUnit::Kmh => KMH_PER_MS,
            SpeedUnit::Ms => 1.0,
            SpeedUnit::Mph => MPH_PER_MS,
        }
    }

    /// Convert a speed expressed in `self` into `target`
    pub fn convert(self, value: f64, target: SpeedUnit) -> f64 {
        if self == target {
            return value;
        }
        value / self.per_ms() * target.per_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_is_identity_for_same_unit() {
        assert_eq!(SpeedUnit::Kmh.convert(123.4, SpeedUnit::Kmh), 123.4);
    }

    #[test]
    fn converts_between_units() {
        assert!((SpeedUnit::Ms.convert(10.0, SpeedUnit::Kmh) - 36.0).abs() < 1e-9);
        assert!((SpeedUnit::Kmh.convert(36.0, SpeedUnit::Ms) - 10.0).abs() < 1e-9);
        assert!((SpeedUnit::Mph.convert(60.0, SpeedUnit::Kmh) - 96.56064).abs() < 1e-4);
    }

    #[test]
    fn accepts_host_names_in_config() {
        let unit: SpeedUnit = serde_yaml_ng::from_str("SpeedMPH").unwrap();
        assert_eq!(unit, SpeedUnit::Mph);
        let unit: SpeedUnit = serde_yaml_ng::from_str("ms").unwrap();
        assert_eq!(unit, SpeedUnit::Ms);
    }
}

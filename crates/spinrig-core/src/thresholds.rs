//! Humidity band that gates starting an acquisition.
//!
//! Fibers only spin reliably between 45 % and 55 % relative humidity, so
//! Start Acquisition stays disabled outside that band.

use serde::{Deserialize, Serialize};

use spinrig_types::SensorReading;

/// Default lower bound, inclusive.
pub const DEFAULT_HUMIDITY_MIN: f64 = 45.0;
/// Default upper bound, inclusive.
pub const DEFAULT_HUMIDITY_MAX: f64 = 55.0;

/// Inclusive humidity band plus a switch to turn gating off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HumidityBand {
    pub min: f64,
    pub max: f64,
    /// When false every humidity counts as in band.
    pub gate: bool,
}

impl Default for HumidityBand {
    fn default() -> Self {
        Self {
            min: DEFAULT_HUMIDITY_MIN,
            max: DEFAULT_HUMIDITY_MAX,
            gate: true,
        }
    }
}

impl HumidityBand {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            gate: true,
        }
    }

    /// Whether `humidity` permits starting an acquisition.
    pub fn contains(&self, humidity: f64) -> bool {
        !self.gate || (self.min..=self.max).contains(&humidity)
    }

    /// Whether `reading` permits starting an acquisition.
    pub fn admits(&self, reading: &SensorReading) -> bool {
        self.contains(reading.humidity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_is_inclusive() {
        let band = HumidityBand::default();
        assert!(band.contains(45.0));
        assert!(band.contains(50.0));
        assert!(band.contains(55.0));
        assert!(!band.contains(44.9));
        assert!(!band.contains(55.1));
    }

    #[test]
    fn test_initial_reading_is_out_of_band() {
        assert!(!HumidityBand::default().admits(&SensorReading::default()));
    }

    #[test]
    fn test_gate_off_admits_everything() {
        let band = HumidityBand {
            gate: false,
            ..Default::default()
        };
        assert!(band.contains(0.0));
        assert!(band.contains(99.0));
    }

    #[test]
    fn test_custom_band() {
        let band = HumidityBand::new(30.0, 40.0);
        assert!(band.contains(35.0));
        assert!(!band.contains(50.0));
    }
}

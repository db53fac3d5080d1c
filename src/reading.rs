//! Environmental readings and their thermal classification.

use std::fmt;

/// Below this the room counts as cold.
pub const COLD_BELOW_C: f64 = 15.0;
/// Above this the room counts as hot and alerts fire.
pub const HOT_ABOVE_C: f64 = 27.0;

/// One full observation of the room. Pressure is optional; the barometer
/// may be absent or mid-fault while the hygro sensor keeps reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub pressure_hpa: Option<f64>,
}

/// Thermal band for a temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThermalState {
    Cold,
    Normal,
    Hot,
}

impl ThermalState {
    /// Label used on the wire and in stored rows.
    pub fn wire_label(self) -> &'static str {
        match self {
            ThermalState::Cold => "FRIO",
            ThermalState::Normal => "NORMAL",
            ThermalState::Hot => "CALOR",
        }
    }
}

impl fmt::Display for ThermalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_label())
    }
}

/// Classify a temperature: below 15 is cold, above 27 is hot, both
/// boundaries fall in the normal band.
pub fn classify(temperature_c: f64) -> ThermalState {
    if temperature_c < COLD_BELOW_C {
        ThermalState::Cold
    } else if temperature_c <= HOT_ABOVE_C {
        ThermalState::Normal
    } else {
        ThermalState::Hot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_and_boundaries() {
        assert_eq!(classify(14.9), ThermalState::Cold);
        assert_eq!(classify(15.0), ThermalState::Normal);
        assert_eq!(classify(27.0), ThermalState::Normal);
        assert_eq!(classify(27.1), ThermalState::Hot);
    }

    #[test]
    fn wire_labels() {
        assert_eq!(ThermalState::Cold.wire_label(), "FRIO");
        assert_eq!(ThermalState::Normal.to_string(), "NORMAL");
        assert_eq!(ThermalState::Hot.wire_label(), "CALOR");
    }
}

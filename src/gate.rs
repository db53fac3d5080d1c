//! Change detection between stored readings.
//!
//! Values are rounded to their wire precision first and compared for
//! exact equality afterwards, so two readings that print the same never
//! count as a change.

use crate::reading::Reading;

/// Round to one decimal, the wire precision of temperature and humidity.
pub fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to two decimals, the wire precision of pressure.
pub fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A reading snapped to wire precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedReading {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub pressure_hpa: Option<f64>,
}

impl RoundedReading {
    pub fn from_reading(reading: &Reading) -> Self {
        Self {
            temperature_c: round_tenths(reading.temperature_c),
            humidity_pct: round_tenths(reading.humidity_pct),
            pressure_hpa: reading.pressure_hpa.map(round_hundredths),
        }
    }
}

/// Decides whether a reading differs from the last one confirmed stored.
///
/// A missing pressure never counts as a change on its own; the pressure
/// baseline survives barometer dropouts so a value that comes back
/// unchanged stays deduplicated.
#[derive(Debug, Default)]
pub struct ChangeGate {
    last_sent: Option<RoundedReading>,
}

impl ChangeGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `current` must be stored. The first reading always is.
    pub fn should_send(&self, current: &RoundedReading) -> bool {
        let Some(last) = &self.last_sent else {
            return true;
        };
        if current.temperature_c != last.temperature_c {
            return true;
        }
        if current.humidity_pct != last.humidity_pct {
            return true;
        }
        match (current.pressure_hpa, last.pressure_hpa) {
            (Some(_), None) => true,
            (Some(current), Some(last)) => current != last,
            (None, _) => false,
        }
    }

    /// Advance the baseline after a confirmed store. Call only on
    /// success; a failed store must leave the baseline untouched.
    pub fn record_sent(&mut self, current: RoundedReading) {
        let pressure = current
            .pressure_hpa
            .or(self.last_sent.as_ref().and_then(|last| last.pressure_hpa));
        self.last_sent = Some(RoundedReading {
            pressure_hpa: pressure,
            ..current
        });
    }

    pub fn last_sent(&self) -> Option<&RoundedReading> {
        self.last_sent.as_ref()
    }
}

//! Combined sensor polling.

use tracing::warn;

use crate::bmp280::Bmp280;
use crate::bus::I2cBus;
use crate::hygro::{HygroSample, HygroSensor};

/// What one polling tick observed. Either sensor may be absent or
/// mid-fault; the other keeps reporting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub hygro: Option<HygroSample>,
    pub pressure_hpa: Option<f64>,
}

/// Wraps both sensors and isolates their faults from the poll loop.
/// A sensor that failed bring-up is simply absent here.
pub struct SampleSource<H: HygroSensor, B: I2cBus> {
    hygro: Option<H>,
    barometer: Option<Bmp280<B>>,
}

impl<H: HygroSensor, B: I2cBus> SampleSource<H, B> {
    pub fn new(hygro: Option<H>, barometer: Option<Bmp280<B>>) -> Self {
        Self { hygro, barometer }
    }

    /// Poll whatever hardware is present. Faults are logged and surface
    /// as missing values, never as errors.
    pub fn poll(&mut self) -> Sample {
        let hygro = match self.hygro.as_mut().map(HygroSensor::sample) {
            Some(Ok(sample)) => Some(sample),
            Some(Err(err)) => {
                warn!(target: "ambientd.sample", error = %err, "hygro read failed");
                None
            }
            None => None,
        };
        let pressure_hpa = self
            .barometer
            .as_mut()
            .and_then(Bmp280::read_pressure);
        Sample {
            hygro,
            pressure_hpa,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::bus::{BusError, SensorError};

    struct ScriptedHygro {
        results: VecDeque<Result<HygroSample, SensorError>>,
    }

    impl HygroSensor for ScriptedHygro {
        fn sample(&mut self) -> Result<HygroSample, SensorError> {
            self.results
                .pop_front()
                .unwrap_or(Err(SensorError::Timeout("script exhausted")))
        }
    }

    /// Bus type for sources wired without a barometer.
    struct NoBus;

    impl I2cBus for NoBus {
        fn write_reg(&mut self, _addr: u16, _reg: u8, _value: u8) -> Result<(), BusError> {
            Err(BusError("no bus".into()))
        }

        fn read_reg(&mut self, _addr: u16, _reg: u8, _buf: &mut [u8]) -> Result<(), BusError> {
            Err(BusError("no bus".into()))
        }
    }

    #[test]
    fn hygro_fault_degrades_to_none() {
        let hygro = ScriptedHygro {
            results: VecDeque::from([Err(SensorError::Timeout("response"))]),
        };
        let mut source: SampleSource<_, NoBus> = SampleSource::new(Some(hygro), None);
        let sample = source.poll();
        assert_eq!(sample.hygro, None);
        assert_eq!(sample.pressure_hpa, None);
    }

    #[test]
    fn healthy_hygro_reports() {
        let hygro = ScriptedHygro {
            results: VecDeque::from([Ok(HygroSample {
                temperature_c: 24.0,
                humidity_pct: 55.0,
            })]),
        };
        let mut source: SampleSource<_, NoBus> = SampleSource::new(Some(hygro), None);
        let sample = source.poll();
        assert_eq!(
            sample.hygro,
            Some(HygroSample {
                temperature_c: 24.0,
                humidity_pct: 55.0,
            })
        );
    }

    #[test]
    fn absent_sensors_yield_an_empty_sample() {
        let mut source: SampleSource<ScriptedHygro, NoBus> = SampleSource::new(None, None);
        let sample = source.poll();
        assert_eq!(sample.hygro, None);
        assert_eq!(sample.pressure_hpa, None);
    }
}

//! DHT11 temperature and humidity driver.
//!
//! The sensor speaks a single-wire protocol: the host holds the line low
//! to request a sample, then the sensor answers with a preamble and 40
//! data bits where the length of each high pulse encodes the bit value.

use std::thread;
use std::time::{Duration, Instant};

use rppal::gpio::{Gpio, IoPin, Level, Mode, PullUpDown};

use crate::bus::SensorError;

/// Host start signal: hold the line low at least 18 ms.
const START_LOW: Duration = Duration::from_millis(18);
/// Host release before handing the line to the sensor.
const START_RELEASE: Duration = Duration::from_micros(30);
/// Deadline for each line transition. Generous, the kernel scheduler can
/// stall the reader mid-frame.
const TRANSITION_TIMEOUT: Duration = Duration::from_micros(1_000);
/// High pulses longer than this decode as a one bit.
const ONE_THRESHOLD: Duration = Duration::from_micros(50);

/// One reading from the hygro sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HygroSample {
    pub temperature_c: f64,
    pub humidity_pct: f64,
}

/// Combined temperature and humidity source.
pub trait HygroSensor {
    fn sample(&mut self) -> Result<HygroSample, SensorError>;
}

/// Decode a 5-byte frame: integral humidity, humidity tenths, integral
/// temperature, temperature tenths, checksum over the first four bytes.
pub fn decode_frame(frame: &[u8; 5]) -> Result<HygroSample, SensorError> {
    let sum = frame[0]
        .wrapping_add(frame[1])
        .wrapping_add(frame[2])
        .wrapping_add(frame[3]);
    if sum != frame[4] {
        return Err(SensorError::InvalidFrame("checksum mismatch"));
    }
    Ok(HygroSample {
        humidity_pct: f64::from(frame[0]) + f64::from(frame[1]) / 10.0,
        temperature_c: f64::from(frame[2]) + f64::from(frame[3]) / 10.0,
    })
}

/// DHT11 on a GPIO pin.
pub struct Dht11 {
    pin: IoPin,
}

impl Dht11 {
    /// Claim the data pin and leave the line idle high.
    pub fn open(pin: u8) -> Result<Self, SensorError> {
        let gpio = Gpio::new().map_err(|err| SensorError::Hardware(err.to_string()))?;
        let mut pin = gpio
            .get(pin)
            .map_err(|err| SensorError::Hardware(err.to_string()))?
            .into_io(Mode::Output);
        pin.set_pullupdown(PullUpDown::PullUp);
        pin.set_high();
        Ok(Self { pin })
    }

    fn wait_for(&self, level: Level, what: &'static str) -> Result<(), SensorError> {
        let deadline = Instant::now() + TRANSITION_TIMEOUT;
        while self.pin.read() != level {
            if Instant::now() > deadline {
                return Err(SensorError::Timeout(what));
            }
            std::hint::spin_loop();
        }
        Ok(())
    }
}

impl HygroSensor for Dht11 {
    fn sample(&mut self) -> Result<HygroSample, SensorError> {
        self.pin.set_mode(Mode::Output);
        self.pin.set_low();
        thread::sleep(START_LOW);
        self.pin.set_high();
        spin_for(START_RELEASE);
        self.pin.set_mode(Mode::Input);
        self.pin.set_pullupdown(PullUpDown::PullUp);

        // Sensor preamble: 80 us low, 80 us high, then the first bit gap.
        self.wait_for(Level::Low, "response")?;
        self.wait_for(Level::High, "preamble")?;
        self.wait_for(Level::Low, "first bit gap")?;

        let mut frame = [0u8; 5];
        for bit in 0..40 {
            self.wait_for(Level::High, "bit pulse")?;
            let rose = Instant::now();
            self.wait_for(Level::Low, "bit gap")?;
            if rose.elapsed() > ONE_THRESHOLD {
                frame[bit / 8] |= 1 << (7 - bit % 8);
            }
        }
        decode_frame(&frame)
    }
}

fn spin_for(window: Duration) {
    let end = Instant::now() + window;
    while Instant::now() < end {
        std::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_integral_frame() {
        let sample = decode_frame(&[55, 0, 24, 0, 79]).unwrap();
        assert_eq!(sample.humidity_pct, 55.0);
        assert_eq!(sample.temperature_c, 24.0);
    }

    #[test]
    fn decodes_tenths() {
        let sample = decode_frame(&[55, 2, 24, 5, 86]).unwrap();
        assert_eq!(sample.humidity_pct, 55.2);
        assert_eq!(sample.temperature_c, 24.5);
    }

    #[test]
    fn checksum_wraps_modulo_256() {
        // 200 + 0 + 100 + 0 = 300, stored as 44.
        let sample = decode_frame(&[200, 0, 100, 0, 44]).unwrap();
        assert_eq!(sample.humidity_pct, 200.0);
        assert_eq!(sample.temperature_c, 100.0);
    }

    #[test]
    fn rejects_bad_checksum() {
        let err = decode_frame(&[55, 0, 24, 0, 80]).unwrap_err();
        assert!(matches!(err, SensorError::InvalidFrame(_)));
    }
}

//! BMP280 barometric pressure driver.
//!
//! Bring-up follows the vendor flow: probe both addresses, soft reset,
//! read the calibration shadow, then normal mode with x1 oversampling and
//! a 1000 ms standby. Compensation uses the datasheet double precision
//! formulas throughout.

use std::ops::RangeInclusive;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::bus::{I2cBus, SensorError};

/// Device address with SDO tied low.
pub const ADDR_PRIMARY: u16 = 0x76;
/// Device address with SDO tied high.
pub const ADDR_SECONDARY: u16 = 0x77;

const REG_ID: u8 = 0xD0;
const REG_RESET: u8 = 0xE0;
const REG_CTRL_MEAS: u8 = 0xF4;
const REG_CONFIG: u8 = 0xF5;
const REG_CALIB_START: u8 = 0x88;
const REG_DATA_START: u8 = 0xF7;

const CMD_SOFT_RESET: u8 = 0xB6;
/// osrs_t x1, osrs_p x1, normal mode.
const CTRL_MEAS_NORMAL_X1: u8 = 0x27;
/// 1000 ms standby, filter off.
const CONFIG_STANDBY_1000MS: u8 = 0xA0;

const RESET_SETTLE: Duration = Duration::from_millis(10);
const CONFIG_SETTLE: Duration = Duration::from_millis(200);
const MEASURE_SETTLE: Duration = Duration::from_millis(10);

/// Compensation denominators below this are treated as degenerate.
const DENOMINATOR_FLOOR: f64 = 1e-4;

/// Readings outside this band are discarded as glitches. Both ends count
/// as plausible.
const PLAUSIBLE_HPA: RangeInclusive<f64> = 600.0..=1200.0;

/// Factory trim values from the calibration shadow at 0x88.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,
    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,
}

impl Calibration {
    /// Decode the 24-byte little-endian calibration shadow.
    pub fn from_bytes(raw: &[u8; 24]) -> Self {
        let unsigned = |i: usize| u16::from_le_bytes([raw[i], raw[i + 1]]);
        let signed = |i: usize| i16::from_le_bytes([raw[i], raw[i + 1]]);
        Self {
            dig_t1: unsigned(0),
            dig_t2: signed(2),
            dig_t3: signed(4),
            dig_p1: unsigned(6),
            dig_p2: signed(8),
            dig_p3: signed(10),
            dig_p4: signed(12),
            dig_p5: signed(14),
            dig_p6: signed(16),
            dig_p7: signed(18),
            dig_p8: signed(20),
            dig_p9: signed(22),
        }
    }

    /// Fine temperature term shared by the pressure compensation.
    pub fn t_fine(&self, adc_t: u32) -> f64 {
        let var1 =
            (adc_t as f64 / 16384.0 - self.dig_t1 as f64 / 1024.0) * self.dig_t2 as f64;
        let var2 = (adc_t as f64 / 131072.0 - self.dig_t1 as f64 / 8192.0)
            * (adc_t as f64 / 131072.0 - self.dig_t1 as f64 / 8192.0)
            * self.dig_t3 as f64;
        var1 + var2
    }

    /// Compensated pressure in pascals. `None` when the denominator
    /// degenerates and no finite value can be produced.
    pub fn pressure_pa(&self, adc_p: u32, t_fine: f64) -> Option<f64> {
        let mut var1 = t_fine / 2.0 - 64000.0;
        let mut var2 = var1 * var1 * self.dig_p6 as f64 / 32768.0;
        var2 += var1 * self.dig_p5 as f64 * 2.0;
        var2 = var2 / 4.0 + self.dig_p4 as f64 * 65536.0;
        var1 =
            (self.dig_p3 as f64 * var1 * var1 / 524288.0 + self.dig_p2 as f64 * var1) / 524288.0;
        var1 = (1.0 + var1 / 32768.0) * self.dig_p1 as f64;
        if var1.abs() < DENOMINATOR_FLOOR {
            return None;
        }
        let mut p = 1048576.0 - adc_p as f64;
        p = (p - var2 / 4096.0) * 6250.0 / var1;
        var1 = self.dig_p9 as f64 * p * p / 2147483648.0;
        var2 = p * self.dig_p8 as f64 / 32768.0;
        Some(p + (var1 + var2 + self.dig_p7 as f64) / 16.0)
    }
}

/// One burst read of the measurement registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame {
    pub pressure: u32,
    pub temperature: u32,
}

impl RawFrame {
    /// Unpack the two 20-bit readings from the six data bytes at 0xF7.
    pub fn unpack(data: &[u8; 6]) -> Self {
        let reading = |msb: u8, lsb: u8, xlsb: u8| {
            (u32::from(msb) << 12) | (u32::from(lsb) << 4) | (u32::from(xlsb) >> 4)
        };
        Self {
            pressure: reading(data[0], data[1], data[2]),
            temperature: reading(data[3], data[4], data[5]),
        }
    }
}

/// BMP280 over any [`I2cBus`].
pub struct Bmp280<B: I2cBus> {
    bus: B,
    addr: u16,
    calib: Calibration,
}

impl<B: I2cBus> Bmp280<B> {
    /// Probe both addresses, reset the chip and load its calibration.
    ///
    /// [`SensorError::Absent`] when neither address answers; a bus error
    /// when the device answers but bring-up fails partway.
    pub fn init(mut bus: B) -> Result<Self, SensorError> {
        let mut id = [0u8; 1];
        let addr = [ADDR_PRIMARY, ADDR_SECONDARY]
            .into_iter()
            .find(|&addr| bus.read_reg(addr, REG_ID, &mut id).is_ok())
            .ok_or(SensorError::Absent)?;
        debug!(target: "ambientd.bmp280", addr, chip_id = id[0], "barometer found");

        bus.write_reg(addr, REG_RESET, CMD_SOFT_RESET)?;
        thread::sleep(RESET_SETTLE);

        let mut raw = [0u8; 24];
        bus.read_reg(addr, REG_CALIB_START, &mut raw)?;
        let calib = Calibration::from_bytes(&raw);

        bus.write_reg(addr, REG_CTRL_MEAS, CTRL_MEAS_NORMAL_X1)?;
        bus.write_reg(addr, REG_CONFIG, CONFIG_STANDBY_1000MS)?;
        thread::sleep(CONFIG_SETTLE);

        Ok(Self { bus, addr, calib })
    }

    /// One compensated sample in hectopascals.
    ///
    /// Bus faults, degenerate compensation and implausible values all
    /// degrade to `None` so the caller keeps running without pressure.
    pub fn read_pressure(&mut self) -> Option<f64> {
        thread::sleep(MEASURE_SETTLE);
        let mut data = [0u8; 8];
        if let Err(err) = self.bus.read_reg(self.addr, REG_DATA_START, &mut data) {
            warn!(target: "ambientd.bmp280", error = %err, "pressure read failed");
            return None;
        }
        let head: &[u8; 6] = data[..6].try_into().ok()?;
        let frame = RawFrame::unpack(head);
        let t_fine = self.calib.t_fine(frame.temperature);
        let Some(pa) = self.calib.pressure_pa(frame.pressure, t_fine) else {
            warn!(target: "ambientd.bmp280", "degenerate compensation, sample discarded");
            return None;
        };
        let hpa = pa / 100.0;
        if !PLAUSIBLE_HPA.contains(&hpa) {
            warn!(target: "ambientd.bmp280", hpa, "pressure out of range, sample discarded");
            return None;
        }
        Some(hpa)
    }
}

//! I2C register access and the sensor fault taxonomy.
//!
//! Drivers talk to the bus through [`I2cBus`] instead of holding an
//! `rppal::i2c::I2c` directly, so the register decoding and compensation
//! paths can be exercised with canned bytes.

use rppal::i2c::I2c;
use tracing::debug;

/// A failed bus transaction. The message keeps whatever detail the
/// underlying driver reported.
#[derive(Debug, Clone, thiserror::Error)]
#[error("i2c fault: {0}")]
pub struct BusError(pub String);

impl From<rppal::i2c::Error> for BusError {
    fn from(err: rppal::i2c::Error) -> Self {
        BusError(err.to_string())
    }
}

/// Faults a sensor can raise during bring-up or sampling.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    /// Device did not respond on any known address. Disables that sensor
    /// for the process lifetime; there is no retry.
    #[error("sensor not present on the bus")]
    Absent,
    /// A bus transaction failed mid-operation.
    #[error(transparent)]
    Bus(#[from] BusError),
    /// GPIO or other peripheral setup failed.
    #[error("peripheral unavailable: {0}")]
    Hardware(String),
    /// The sensor answered with a frame that fails validation.
    #[error("invalid sensor frame: {0}")]
    InvalidFrame(&'static str),
    /// The sensor did not answer within the protocol deadline.
    #[error("sensor timed out waiting for {0}")]
    Timeout(&'static str),
}

/// Byte-level register access to one I2C bus shared by several devices.
/// The device address travels with every call so a single bus handle can
/// serve sensors at different addresses.
pub trait I2cBus {
    /// Write a single byte to a device register.
    fn write_reg(&mut self, addr: u16, reg: u8, value: u8) -> Result<(), BusError>;

    /// Read `buf.len()` bytes starting at a device register.
    fn read_reg(&mut self, addr: u16, reg: u8, buf: &mut [u8]) -> Result<(), BusError>;
}

/// [`I2cBus`] over the Raspberry Pi hardware bus.
pub struct RppalBus {
    i2c: I2c,
}

impl RppalBus {
    /// Open a hardware bus (`/dev/i2c-<bus>`). The transaction timeout is
    /// best effort; not every adapter driver honors it.
    pub fn open(bus: u8, timeout_ms: u32) -> Result<Self, BusError> {
        let i2c = I2c::with_bus(bus)?;
        if let Err(err) = i2c.set_timeout(timeout_ms) {
            debug!(target: "ambientd.bus", error = %err, "i2c timeout not applied");
        }
        Ok(Self { i2c })
    }
}

impl I2cBus for RppalBus {
    fn write_reg(&mut self, addr: u16, reg: u8, value: u8) -> Result<(), BusError> {
        self.i2c.set_slave_address(addr)?;
        self.i2c.write(&[reg, value])?;
        Ok(())
    }

    fn read_reg(&mut self, addr: u16, reg: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.i2c.set_slave_address(addr)?;
        self.i2c.write_read(&[reg], buf)?;
        Ok(())
    }
}

//! Room environment monitor for Raspberry Pi.
//!
//! A single blocking thread polls a DHT11 (temperature/humidity, GPIO) and a
//! BMP280 (pressure, I2C), classifies the temperature into a thermal state,
//! and forwards readings to two remote services: a chat bot for heat alerts
//! and a REST store for history. Store writes are deduplicated against the
//! last reading the store actually accepted, so an idle room produces almost
//! no traffic.
//!
//! Hardware and network collaborators sit behind small traits ([`bus::I2cBus`],
//! [`hygro::HygroSensor`], [`alert::Actuator`], [`remote::AlertChannel`],
//! [`remote::ReadingStore`], [`probe::NetworkLink`]) so everything above them
//! is testable without a Raspberry Pi or network access.
//!
//! No failure is fatal: a missing sensor disables its readings, a failed
//! remote write is retried on the next changed reading, and unreachable
//! services only degrade the capabilities that need them.

pub mod alert;
pub mod bmp280;
pub mod bus;
pub mod config;
pub mod gate;
pub mod hygro;
pub mod monitor;
pub mod probe;
pub mod reading;
pub mod remote;
pub mod report;
pub mod sample;

pub use alert::{Actuator, AlertDispatcher, AlertEvent, GpioActuator};
pub use bmp280::{Bmp280, Calibration, RawFrame};
pub use bus::{BusError, I2cBus, RppalBus, SensorError};
pub use config::{AppConfig, ConfigError};
pub use gate::{ChangeGate, RoundedReading};
pub use hygro::{Dht11, HygroSample, HygroSensor};
pub use monitor::Monitor;
pub use probe::{verify_services, NetworkLink, ProbeSettings, ServiceHealth, SysfsLink};
pub use reading::{classify, Reading, ThermalState};
pub use remote::{
    AlertChannel, ReadingStore, StoreRecord, SupabaseStore, TelegramChannel, TransmitError,
};
pub use report::{ReportOutcome, TelemetryReporter};
pub use sample::{Sample, SampleSource};

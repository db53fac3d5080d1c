//! Heat alerts: buzzer plus chat message.
//!
//! Alerts fire on every hot tick with no deduplication; a room that
//! stays hot keeps beeping until it cools down.

use std::thread;
use std::time::Duration;

use rppal::gpio::{Gpio, OutputPin};
use tracing::warn;

use crate::gate::RoundedReading;
use crate::reading::{Reading, ThermalState};
use crate::remote::AlertChannel;

/// Buzzer tone while an alert sounds.
pub const BUZZER_FREQUENCY_HZ: u32 = 1500;
/// How long the buzzer sounds per alert.
pub const BUZZER_DURATION: Duration = Duration::from_millis(2000);

/// Local outputs the monitor drives.
pub trait Actuator {
    /// Sound the buzzer, blocking for the duration.
    fn beep(&mut self, frequency_hz: u32, duration: Duration);

    /// Drive the heartbeat lamp.
    fn set_lamp(&mut self, on: bool);
}

/// One dispatched alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertEvent {
    pub message: String,
}

/// Sounds the buzzer and pushes a chat message for hot readings.
pub struct AlertDispatcher<C: AlertChannel> {
    channel: C,
}

impl<C: AlertChannel> AlertDispatcher<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    /// React to a classified reading. Hot fires an alert; anything else
    /// is a no-op. A failed chat delivery is logged, never escalated.
    pub fn on_classified<A: Actuator>(
        &mut self,
        state: ThermalState,
        reading: &Reading,
        actuator: &mut A,
    ) -> Option<AlertEvent> {
        if state != ThermalState::Hot {
            return None;
        }
        let rounded = RoundedReading::from_reading(reading);
        let message = match rounded.pressure_hpa {
            Some(pressure) => format!(
                "ALERTA: Temperatura alta {:.1}°C - Humedad {:.1}% - Presión {:.2} hPa",
                rounded.temperature_c, rounded.humidity_pct, pressure
            ),
            None => format!(
                "ALERTA: Temperatura alta {:.1}°C - Humedad {:.1}% - Presión N/A",
                rounded.temperature_c, rounded.humidity_pct
            ),
        };
        warn!(
            target: "ambientd.alert",
            temperature_c = rounded.temperature_c,
            "heat alert"
        );
        actuator.beep(BUZZER_FREQUENCY_HZ, BUZZER_DURATION);
        if let Err(err) = self.channel.send(&message) {
            warn!(target: "ambientd.alert", error = %err, "alert message not delivered");
        }
        Some(AlertEvent { message })
    }
}

/// Buzzer and heartbeat lamp on GPIO pins.
///
/// Opening never fails wholesale. A pin that cannot be claimed logs a
/// warning and that output stays disabled.
pub struct GpioActuator {
    buzzer: Option<OutputPin>,
    lamp: Option<OutputPin>,
}

impl GpioActuator {
    pub fn open(buzzer_pin: u8, lamp_pin: u8) -> Self {
        let gpio = match Gpio::new() {
            Ok(gpio) => gpio,
            Err(err) => {
                warn!(target: "ambientd.alert", error = %err, "gpio unavailable, outputs disabled");
                return Self {
                    buzzer: None,
                    lamp: None,
                };
            }
        };
        let buzzer = match gpio.get(buzzer_pin) {
            Ok(pin) => {
                let mut pin = pin.into_output();
                pin.set_low();
                Some(pin)
            }
            Err(err) => {
                warn!(target: "ambientd.alert", pin = buzzer_pin, error = %err, "buzzer pin unavailable");
                None
            }
        };
        let lamp = match gpio.get(lamp_pin) {
            Ok(pin) => Some(pin.into_output()),
            Err(err) => {
                warn!(target: "ambientd.alert", pin = lamp_pin, error = %err, "lamp pin unavailable");
                None
            }
        };
        Self { buzzer, lamp }
    }
}

impl Actuator for GpioActuator {
    fn beep(&mut self, frequency_hz: u32, duration: Duration) {
        let Some(buzzer) = &mut self.buzzer else {
            return;
        };
        if let Err(err) = buzzer.set_pwm_frequency(f64::from(frequency_hz), 0.5) {
            warn!(target: "ambientd.alert", error = %err, "buzzer pwm failed");
            return;
        }
        thread::sleep(duration);
        if let Err(err) = buzzer.clear_pwm() {
            warn!(target: "ambientd.alert", error = %err, "buzzer stop failed");
        }
    }

    fn set_lamp(&mut self, on: bool) {
        if let Some(lamp) = &mut self.lamp {
            if on {
                lamp.set_high();
            } else {
                lamp.set_low();
            }
        }
    }
}

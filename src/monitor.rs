//! The polling loop: observe, classify, alert, report, idle.

use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::alert::{Actuator, AlertDispatcher};
use crate::bus::I2cBus;
use crate::hygro::HygroSensor;
use crate::reading::{classify, Reading};
use crate::remote::{AlertChannel, ReadingStore};
use crate::report::{ReportOutcome, TelemetryReporter};
use crate::sample::SampleSource;

/// Lit slice of the idle-wait heartbeat.
const HEARTBEAT_ON: Duration = Duration::from_millis(100);
/// Momentary off slice that makes the heartbeat visible.
const HEARTBEAT_OFF: Duration = Duration::from_millis(30);

/// Single-threaded monitor. Everything is sequential and blocking;
/// every fault degrades one capability and the loop keeps running.
pub struct Monitor<H, B, A, C, S>
where
    H: HygroSensor,
    B: I2cBus,
    A: Actuator,
    C: AlertChannel,
    S: ReadingStore,
{
    source: SampleSource<H, B>,
    actuator: A,
    dispatcher: AlertDispatcher<C>,
    reporter: TelemetryReporter<S>,
    readings: u64,
}

impl<H, B, A, C, S> Monitor<H, B, A, C, S>
where
    H: HygroSensor,
    B: I2cBus,
    A: Actuator,
    C: AlertChannel,
    S: ReadingStore,
{
    pub fn new(
        source: SampleSource<H, B>,
        actuator: A,
        dispatcher: AlertDispatcher<C>,
        reporter: TelemetryReporter<S>,
    ) -> Self {
        Self {
            source,
            actuator,
            dispatcher,
            reporter,
            readings: 0,
        }
    }

    /// Readings processed so far. Ticks without a hygro sample do not
    /// count.
    pub fn readings(&self) -> u64 {
        self.readings
    }

    /// One observe-classify-alert-report pass.
    pub fn tick(&mut self) {
        self.actuator.set_lamp(true);
        let sample = self.source.poll();
        let Some(hygro) = sample.hygro else {
            warn!(target: "ambientd.monitor", "no hygro reading this tick");
            return;
        };
        self.readings += 1;
        let reading = Reading {
            temperature_c: hygro.temperature_c,
            humidity_pct: hygro.humidity_pct,
            pressure_hpa: sample.pressure_hpa,
        };
        let state = classify(reading.temperature_c);
        let alert = self
            .dispatcher
            .on_classified(state, &reading, &mut self.actuator);
        match self.reporter.report(&reading, state, alert.is_some()) {
            Ok(ReportOutcome::Sent) => {
                info!(target: "ambientd.monitor", "reading stored");
            }
            Ok(ReportOutcome::Unchanged) => {
                info!(target: "ambientd.monitor", "reading unchanged, store write skipped");
            }
            Err(err) => {
                warn!(
                    target: "ambientd.monitor",
                    error = %err,
                    "store write failed, reading stays eligible"
                );
            }
        }
        info!(
            target: "ambientd.monitor",
            reading = self.readings,
            temperature_c = reading.temperature_c,
            humidity_pct = reading.humidity_pct,
            pressure_hpa = ?reading.pressure_hpa,
            state = %state,
            "tick"
        );
    }

    /// Run at the given cadence for the process lifetime.
    pub fn run(&mut self, period: Duration) -> ! {
        loop {
            self.tick();
            self.idle_wait(period);
        }
    }

    /// Idle between ticks, blinking the lamp as a heartbeat.
    fn idle_wait(&mut self, period: Duration) {
        let slices = (period.as_millis() / HEARTBEAT_ON.as_millis()).max(1);
        for _ in 0..slices {
            thread::sleep(HEARTBEAT_ON);
            self.actuator.set_lamp(false);
            thread::sleep(HEARTBEAT_OFF);
            self.actuator.set_lamp(true);
        }
    }
}

//! End-to-end monitor behavior against fake sensors and collaborators.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use ambientd::{
    Actuator, AlertChannel, AlertDispatcher, BusError, HygroSample, HygroSensor, I2cBus, Monitor,
    ReadingStore, SampleSource, SensorError, StoreRecord, TelemetryReporter, TransmitError,
};

struct ScriptedHygro {
    samples: VecDeque<HygroSample>,
}

impl ScriptedHygro {
    fn with_temps(temps: &[f64]) -> Self {
        Self {
            samples: temps
                .iter()
                .map(|&t| HygroSample {
                    temperature_c: t,
                    humidity_pct: 40.0,
                })
                .collect(),
        }
    }
}

impl HygroSensor for ScriptedHygro {
    fn sample(&mut self) -> Result<HygroSample, SensorError> {
        self.samples
            .pop_front()
            .ok_or(SensorError::Timeout("script exhausted"))
    }
}

struct NoBus;

impl I2cBus for NoBus {
    fn write_reg(&mut self, _addr: u16, _reg: u8, _value: u8) -> Result<(), BusError> {
        Err(BusError("no bus".into()))
    }

    fn read_reg(&mut self, _addr: u16, _reg: u8, _buf: &mut [u8]) -> Result<(), BusError> {
        Err(BusError("no bus".into()))
    }
}

#[derive(Default)]
struct CountingActuator {
    beeps: Rc<RefCell<Vec<(u32, Duration)>>>,
}

impl Actuator for CountingActuator {
    fn beep(&mut self, frequency_hz: u32, duration: Duration) {
        self.beeps.borrow_mut().push((frequency_hz, duration));
    }

    fn set_lamp(&mut self, _on: bool) {}
}

#[derive(Default)]
struct RecordingChannel {
    sent: Rc<RefCell<Vec<String>>>,
}

impl AlertChannel for RecordingChannel {
    fn send(&mut self, text: &str) -> Result<(), TransmitError> {
        self.sent.borrow_mut().push(text.to_string());
        Ok(())
    }

    fn probe(&mut self) -> bool {
        true
    }
}

#[derive(Default)]
struct RecordingStore {
    rows: Rc<RefCell<Vec<StoreRecord>>>,
}

impl ReadingStore for RecordingStore {
    fn insert(&mut self, record: &StoreRecord) -> Result<(), TransmitError> {
        self.rows.borrow_mut().push(record.clone());
        Ok(())
    }

    fn probe(&mut self) -> bool {
        true
    }
}

#[test]
fn three_ticks_store_twice_and_alert_once() {
    let hygro = ScriptedHygro::with_temps(&[10.0, 10.0, 30.0]);
    let actuator = CountingActuator::default();
    let beeps = Rc::clone(&actuator.beeps);
    let channel = RecordingChannel::default();
    let sent = Rc::clone(&channel.sent);
    let store = RecordingStore::default();
    let rows = Rc::clone(&store.rows);

    let source: SampleSource<_, NoBus> = SampleSource::new(Some(hygro), None);
    let mut monitor = Monitor::new(
        source,
        actuator,
        AlertDispatcher::new(channel),
        TelemetryReporter::new(store),
    );

    // Tick 1 establishes the baseline.
    monitor.tick();
    assert_eq!(rows.borrow().len(), 1);
    assert!(sent.borrow().is_empty());
    assert!(beeps.borrow().is_empty());

    // Tick 2 repeats the reading; nothing is stored.
    monitor.tick();
    assert_eq!(rows.borrow().len(), 1);

    // Tick 3 goes hot: one beep, one message, one stored row.
    monitor.tick();
    assert_eq!(rows.borrow().len(), 2);
    assert_eq!(sent.borrow().len(), 1);
    assert_eq!(beeps.borrow().len(), 1);
    assert_eq!(beeps.borrow()[0], (1500, Duration::from_millis(2000)));
    assert_eq!(
        sent.borrow()[0],
        "ALERTA: Temperatura alta 30.0°C - Humedad 40.0% - Presión N/A"
    );

    let stored = rows.borrow();
    assert_eq!(stored[0].temperatura, 10.0);
    assert_eq!(stored[0].humedad, 40.0);
    assert_eq!(stored[0].estado, "FRIO");
    assert!(!stored[0].es_alerta);
    assert_eq!(stored[0].presion, None);

    assert_eq!(stored[1].temperatura, 30.0);
    assert_eq!(stored[1].estado, "CALOR");
    assert!(stored[1].es_alerta);
    assert_eq!(stored[1].presion, None);

    assert_eq!(monitor.readings(), 3);
}

#[test]
fn repeated_hot_ticks_alert_every_time_but_store_once() {
    let hygro = ScriptedHygro::with_temps(&[30.0, 30.0]);
    let actuator = CountingActuator::default();
    let beeps = Rc::clone(&actuator.beeps);
    let channel = RecordingChannel::default();
    let sent = Rc::clone(&channel.sent);
    let store = RecordingStore::default();
    let rows = Rc::clone(&store.rows);

    let source: SampleSource<_, NoBus> = SampleSource::new(Some(hygro), None);
    let mut monitor = Monitor::new(
        source,
        actuator,
        AlertDispatcher::new(channel),
        TelemetryReporter::new(store),
    );

    monitor.tick();
    monitor.tick();

    // The alert is a safety signal with no dedup; the store write dedups.
    assert_eq!(sent.borrow().len(), 2);
    assert_eq!(beeps.borrow().len(), 2);
    assert_eq!(rows.borrow().len(), 1);
}

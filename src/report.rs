//! Pushes changed readings to the history store.

use crate::gate::{ChangeGate, RoundedReading};
use crate::reading::{Reading, ThermalState};
use crate::remote::{ReadingStore, StoreRecord, TransmitError};

/// What a report attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The reading differed and the store confirmed the insert.
    Sent,
    /// The reading matched the last stored one; nothing was sent.
    Unchanged,
}

/// Dedup gate plus store client. The gate baseline only advances on a
/// confirmed insert, so a failed store leaves the same reading eligible
/// on the next tick.
pub struct TelemetryReporter<S: ReadingStore> {
    store: S,
    gate: ChangeGate,
}

impl<S: ReadingStore> TelemetryReporter<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            gate: ChangeGate::new(),
        }
    }

    /// Store the reading when it differs from the last confirmed one.
    pub fn report(
        &mut self,
        reading: &Reading,
        state: ThermalState,
        is_alert: bool,
    ) -> Result<ReportOutcome, TransmitError> {
        let current = RoundedReading::from_reading(reading);
        if !self.gate.should_send(&current) {
            return Ok(ReportOutcome::Unchanged);
        }
        let record = StoreRecord {
            temperatura: current.temperature_c,
            humedad: current.humidity_pct,
            estado: state.wire_label(),
            es_alerta: is_alert,
            presion: current.pressure_hpa,
        };
        self.store.insert(&record)?;
        self.gate.record_sent(current);
        Ok(ReportOutcome::Sent)
    }

    pub fn last_sent(&self) -> Option<&RoundedReading> {
        self.gate.last_sent()
    }
}

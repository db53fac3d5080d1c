//! Startup availability check for the remote collaborators.

use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::remote::{AlertChannel, ReadingStore};

/// Network link state source.
pub trait NetworkLink {
    fn is_up(&mut self) -> bool;
}

/// Link state from the kernel's view of one interface.
pub struct SysfsLink {
    operstate: PathBuf,
}

impl SysfsLink {
    pub fn new(interface: &str) -> Self {
        Self {
            operstate: PathBuf::from(format!("/sys/class/net/{interface}/operstate")),
        }
    }
}

impl NetworkLink for SysfsLink {
    fn is_up(&mut self) -> bool {
        match fs::read_to_string(&self.operstate) {
            // Some drivers report "unknown" for a working link.
            Ok(state) => matches!(state.trim(), "up" | "unknown"),
            Err(_) => false,
        }
    }
}

/// Retry budget for the availability check.
#[derive(Debug, Clone, Copy)]
pub struct ProbeSettings {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay: Duration::from_secs(5),
        }
    }
}

/// Outcome of the availability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceHealth {
    /// Both collaborators answered.
    Ready,
    /// At least one stayed unreachable; the monitor runs without it.
    Degraded,
}

/// Probe both remote collaborators with bounded retries.
///
/// A down link is logged but the probes still run. Exhausting the
/// attempts is non-fatal; the caller proceeds in degraded mode since
/// sensing and local alerting work without connectivity.
pub fn verify_services<L, C, S>(
    link: &mut L,
    channel: &mut C,
    store: &mut S,
    settings: &ProbeSettings,
) -> ServiceHealth
where
    L: NetworkLink,
    C: AlertChannel,
    S: ReadingStore,
{
    for attempt in 1..=settings.max_attempts {
        info!(
            target: "ambientd.probe",
            attempt,
            max_attempts = settings.max_attempts,
            "verifying remote services"
        );
        if !link.is_up() {
            warn!(target: "ambientd.probe", "network link down");
        }
        let channel_ok = channel.probe();
        let store_ok = store.probe();
        if channel_ok && store_ok {
            info!(target: "ambientd.probe", "remote services available");
            return ServiceHealth::Ready;
        }
        warn!(target: "ambientd.probe", channel_ok, store_ok, "remote services unavailable");
        if attempt < settings.max_attempts {
            thread::sleep(settings.retry_delay);
        }
    }
    warn!(target: "ambientd.probe", "remote services unverified, continuing degraded");
    ServiceHealth::Degraded
}

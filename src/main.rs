use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ambientd::{
    verify_services, Actuator, AlertDispatcher, AppConfig, Bmp280, Dht11, GpioActuator, Monitor,
    ProbeSettings, RppalBus, SampleSource, ServiceHealth, SupabaseStore, SysfsLink,
    TelegramChannel, TelemetryReporter,
};

const DEFAULT_CONFIG_PATH: &str = "/etc/ambientd.toml";
const I2C_TIMEOUT_MS: u32 = 100;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = AppConfig::load(&path)
        .with_context(|| format!("loading configuration from {}", path.display()))?;

    let mut actuator = GpioActuator::open(config.sensors.buzzer_pin, config.sensors.lamp_pin);
    actuator.set_lamp(true);

    let barometer = match RppalBus::open(config.sensors.i2c_bus, I2C_TIMEOUT_MS) {
        Ok(bus) => match Bmp280::init(bus) {
            Ok(sensor) => {
                info!(target: "ambientd", "barometer ready");
                Some(sensor)
            }
            Err(err) => {
                warn!(target: "ambientd", error = %err, "barometer unavailable, pressure disabled");
                None
            }
        },
        Err(err) => {
            warn!(target: "ambientd", error = %err, "i2c bus unavailable, pressure disabled");
            None
        }
    };

    let hygro = match Dht11::open(config.sensors.dht11_pin) {
        Ok(sensor) => {
            info!(target: "ambientd", pin = config.sensors.dht11_pin, "hygro sensor ready");
            Some(sensor)
        }
        Err(err) => {
            warn!(target: "ambientd", error = %err, "hygro sensor unavailable");
            None
        }
    };

    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(config.monitor.http_timeout_secs))
        .build();
    if !config.telegram.is_configured() {
        warn!(target: "ambientd", "telegram credentials missing, alerts stay local");
    }
    if !config.supabase.is_configured() {
        warn!(target: "ambientd", "supabase credentials missing, readings stay local");
    }
    let mut channel = TelegramChannel::new(agent.clone(), &config.telegram);
    let mut store = SupabaseStore::new(agent, &config.supabase);

    let settings = ProbeSettings {
        max_attempts: config.monitor.probe_attempts,
        retry_delay: Duration::from_secs(config.monitor.probe_delay_secs),
    };
    let mut link = SysfsLink::new(&config.network.interface);
    if verify_services(&mut link, &mut channel, &mut store, &settings) == ServiceHealth::Degraded {
        warn!(target: "ambientd", "starting without verified remote services");
    }

    info!(
        target: "ambientd",
        poll_interval_secs = config.monitor.poll_interval_secs,
        "monitor started"
    );
    let mut monitor = Monitor::new(
        SampleSource::new(hygro, barometer),
        actuator,
        AlertDispatcher::new(channel),
        TelemetryReporter::new(store),
    );
    monitor.run(Duration::from_secs(config.monitor.poll_interval_secs))
}

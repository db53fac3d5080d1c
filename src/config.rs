//! TOML configuration.
//!
//! Every section has workable defaults; a missing file leaves the
//! monitor sensing and alerting locally with both remote clients
//! disabled until real credentials are supplied.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

const TOKEN_PLACEHOLDER: &str = "REPLACE_WITH_BOT_TOKEN";
const URL_PLACEHOLDER: &str = "https://REPLACE-PROJECT.supabase.co";
const KEY_PLACEHOLDER: &str = "REPLACE_WITH_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub telegram: TelegramConfig,
    pub supabase: SupabaseConfig,
    pub sensors: SensorsConfig,
    pub monitor: MonitorConfig,
}

impl AppConfig {
    /// Load from a TOML file. A missing file runs on defaults; a file
    /// that exists but does not parse is a startup error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            warn!(
                target: "ambientd.config",
                path = %path.display(),
                "config file missing, using defaults"
            );
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Interface whose link state the startup probe checks.
    pub interface: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            interface: "wlan0".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: i64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: TOKEN_PLACEHOLDER.into(),
            chat_id: 0,
        }
    }
}

impl TelegramConfig {
    /// Placeholder or empty credentials leave the channel disabled.
    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && self.bot_token != TOKEN_PLACEHOLDER && self.chat_id != 0
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SupabaseConfig {
    pub url: String,
    pub api_key: String,
    pub table: String,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: URL_PLACEHOLDER.into(),
            api_key: KEY_PLACEHOLDER.into(),
            table: "sensor_readings".into(),
        }
    }
}

impl SupabaseConfig {
    /// Placeholder or empty credentials leave the store disabled.
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
            && !self.api_key.is_empty()
            && self.url != URL_PLACEHOLDER
            && self.api_key != KEY_PLACEHOLDER
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SensorsConfig {
    pub i2c_bus: u8,
    pub dht11_pin: u8,
    pub buzzer_pin: u8,
    pub lamp_pin: u8,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            i2c_bus: 1,
            dht11_pin: 4,
            buzzer_pin: 18,
            lamp_pin: 17,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub poll_interval_secs: u64,
    pub http_timeout_secs: u64,
    pub probe_attempts: u32,
    pub probe_delay_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 3,
            http_timeout_secs: 10,
            probe_attempts: 5,
            probe_delay_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const FULL: &str = r#"
        [network]
        interface = "eth0"

        [telegram]
        bot_token = "123456:AAexample"
        chat_id = 99887766

        [supabase]
        url = "https://project.supabase.co"
        api_key = "service-key"
        table = "lecturas"

        [sensors]
        i2c_bus = 0
        dht11_pin = 17
        buzzer_pin = 12
        lamp_pin = 16

        [monitor]
        poll_interval_secs = 10
        http_timeout_secs = 5
        probe_attempts = 2
        probe_delay_secs = 1
    "#;

    #[test]
    fn parses_a_full_file() {
        let config: AppConfig = toml::from_str(FULL).unwrap();
        assert_eq!(config.network.interface, "eth0");
        assert!(config.telegram.is_configured());
        assert!(config.supabase.is_configured());
        assert_eq!(config.supabase.table, "lecturas");
        assert_eq!(config.sensors.dht11_pin, 17);
        assert_eq!(config.monitor.poll_interval_secs, 10);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [telegram]
            bot_token = "123456:AAexample"
            chat_id = 42
            "#,
        )
        .unwrap();
        assert!(config.telegram.is_configured());
        assert!(!config.supabase.is_configured());
        assert_eq!(config.network.interface, "wlan0");
        assert_eq!(config.sensors.i2c_bus, 1);
        assert_eq!(config.monitor.probe_attempts, 5);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/ambientd.toml")).unwrap();
        assert!(!config.telegram.is_configured());
        assert!(!config.supabase.is_configured());
        assert_eq!(config.monitor.poll_interval_secs, 3);
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ambientd.toml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(FULL.as_bytes()).unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.network.interface, "eth0");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ambientd.toml");
        fs::write(&path, "monitor = \"not a table\"").unwrap();
        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn placeholders_and_empties_are_unconfigured() {
        assert!(!TelegramConfig::default().is_configured());
        assert!(!SupabaseConfig::default().is_configured());

        let no_chat = TelegramConfig {
            bot_token: "123456:AAexample".into(),
            chat_id: 0,
        };
        assert!(!no_chat.is_configured());

        let empty_key = SupabaseConfig {
            url: "https://project.supabase.co".into(),
            api_key: String::new(),
            table: "sensor_readings".into(),
        };
        assert!(!empty_key.is_configured());
    }
}

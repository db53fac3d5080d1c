//! Outbound HTTP: the chat channel for alerts and the REST store for
//! reading history.
//!
//! Both clients sit behind traits so the monitor and the reporter can be
//! exercised against fakes. Placeholder credentials degrade a client to
//! a permanent not-configured state instead of producing doomed requests.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{SupabaseConfig, TelegramConfig};

/// A failed or refused transmission.
#[derive(Debug, thiserror::Error)]
pub enum TransmitError {
    #[error("{0} not configured")]
    NotConfigured(&'static str),
    #[error("transport: {0}")]
    Transport(String),
    #[error("unexpected http status {0}")]
    Status(u16),
}

impl From<ureq::Error> for TransmitError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => TransmitError::Status(code),
            ureq::Error::Transport(transport) => TransmitError::Transport(transport.to_string()),
        }
    }
}

/// Row shape of the reading history table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreRecord {
    pub temperatura: f64,
    pub humedad: f64,
    pub estado: &'static str,
    pub es_alerta: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presion: Option<f64>,
}

/// Where alert messages go.
pub trait AlertChannel {
    fn send(&mut self, text: &str) -> Result<(), TransmitError>;

    /// Cheap reachability check, used by the startup probe.
    fn probe(&mut self) -> bool;
}

/// Where reading rows go.
pub trait ReadingStore {
    fn insert(&mut self, record: &StoreRecord) -> Result<(), TransmitError>;

    /// Cheap reachability check, used by the startup probe.
    fn probe(&mut self) -> bool;
}

/// Telegram bot API client.
pub struct TelegramChannel {
    agent: ureq::Agent,
    token: String,
    chat_id: i64,
    configured: bool,
}

#[derive(Deserialize)]
struct GetMeReply {
    ok: bool,
}

impl TelegramChannel {
    pub fn new(agent: ureq::Agent, cfg: &TelegramConfig) -> Self {
        Self {
            agent,
            token: cfg.bot_token.clone(),
            chat_id: cfg.chat_id,
            configured: cfg.is_configured(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.token, method)
    }
}

impl AlertChannel for TelegramChannel {
    fn send(&mut self, text: &str) -> Result<(), TransmitError> {
        if !self.configured {
            return Err(TransmitError::NotConfigured("telegram"));
        }
        let response = self
            .agent
            .post(&self.endpoint("sendMessage"))
            .send_json(serde_json::json!({
                "chat_id": self.chat_id,
                "text": text,
            }))?;
        match response.status() {
            200 => Ok(()),
            code => Err(TransmitError::Status(code)),
        }
    }

    fn probe(&mut self) -> bool {
        if !self.configured {
            return false;
        }
        match self.agent.get(&self.endpoint("getMe")).call() {
            Ok(response) => response
                .into_json::<GetMeReply>()
                .map(|reply| reply.ok)
                .unwrap_or(false),
            Err(err) => {
                debug!(target: "ambientd.remote", error = %TransmitError::from(err), "telegram probe failed");
                false
            }
        }
    }
}

/// Supabase REST client for the reading history table.
pub struct SupabaseStore {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
    table: String,
    configured: bool,
}

impl SupabaseStore {
    pub fn new(agent: ureq::Agent, cfg: &SupabaseConfig) -> Self {
        Self {
            agent,
            base_url: cfg.url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            table: cfg.table.clone(),
            configured: cfg.is_configured(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorized(&self, request: ureq::Request) -> ureq::Request {
        request
            .set("apikey", &self.api_key)
            .set("Authorization", &format!("Bearer {}", self.api_key))
    }
}

impl ReadingStore for SupabaseStore {
    fn insert(&mut self, record: &StoreRecord) -> Result<(), TransmitError> {
        if !self.configured {
            return Err(TransmitError::NotConfigured("supabase"));
        }
        let request = self
            .authorized(self.agent.post(&self.table_url()))
            .set("Prefer", "return=minimal");
        let response = request.send_json(record)?;
        match response.status() {
            200 | 201 => Ok(()),
            code => Err(TransmitError::Status(code)),
        }
    }

    fn probe(&mut self) -> bool {
        if !self.configured {
            return false;
        }
        let url = format!("{}?select=id&limit=1", self.table_url());
        let request = self.authorized(self.agent.get(&url)).set("Range", "0-0");
        match request.call() {
            Ok(response) => response.status() == 200,
            Err(err) => {
                debug!(target: "ambientd.remote", error = %TransmitError::from(err), "supabase probe failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SupabaseConfig, TelegramConfig};

    #[test]
    fn record_serializes_without_missing_pressure() {
        let record = StoreRecord {
            temperatura: 28.5,
            humedad: 40.0,
            estado: "CALOR",
            es_alerta: true,
            presion: None,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["temperatura"], 28.5);
        assert_eq!(value["estado"], "CALOR");
        assert_eq!(value["es_alerta"], true);
        assert!(value.get("presion").is_none());
    }

    #[test]
    fn record_serializes_pressure_when_present() {
        let record = StoreRecord {
            temperatura: 20.0,
            humedad: 40.0,
            estado: "NORMAL",
            es_alerta: false,
            presion: Some(1006.53),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["presion"], 1006.53);
    }

    #[test]
    fn placeholder_credentials_disable_the_store() {
        let agent = ureq::AgentBuilder::new().build();
        let mut store = SupabaseStore::new(agent, &SupabaseConfig::default());
        let record = StoreRecord {
            temperatura: 20.0,
            humedad: 40.0,
            estado: "NORMAL",
            es_alerta: false,
            presion: None,
        };
        assert!(matches!(
            store.insert(&record),
            Err(TransmitError::NotConfigured(_))
        ));
        assert!(!store.probe());
    }

    #[test]
    fn placeholder_credentials_disable_the_channel() {
        let agent = ureq::AgentBuilder::new().build();
        let mut channel = TelegramChannel::new(agent, &TelegramConfig::default());
        assert!(matches!(
            channel.send("hola"),
            Err(TransmitError::NotConfigured(_))
        ));
        assert!(!channel.probe());
    }

    #[test]
    fn trailing_slash_is_trimmed_from_the_base_url() {
        let agent = ureq::AgentBuilder::new().build();
        let cfg = SupabaseConfig {
            url: "https://example.supabase.co/".into(),
            ..SupabaseConfig::default()
        };
        let store = SupabaseStore::new(agent, &cfg);
        assert_eq!(
            store.table_url(),
            "https://example.supabase.co/rest/v1/sensor_readings"
        );
    }
}

//! Service configuration file
//!
//! One JSON document configures a host deployment:
//!
//! ```json
//! {
//!   "telegram": { "bot_token": "...", "chat_id": "-100123" },
//!   "firebase": { "host": "project-default-rtdb.firebaseio.com", "auth": "..." },
//!   "http":     { "timeout_secs": 10 },
//!   "monitor":  { "threshold_offset": 120 },
//!   "queue_capacity": 16
//! }
//! ```
//!
//! Every section and field is optional and falls back to its default.
//! Secrets are usually left out of the file and supplied through the
//! environment; [`ServiceConfig::load`] therefore only parses, and
//! [`ServiceConfig::validate`] runs after the overrides are applied.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use vayuveer_core::MonitorConfig;

use crate::{
    firebase::FirebaseConfig, http::HttpConfig, telegram::TelegramConfig, ConnectorError, Result,
};

/// Reporter queue depth when the file does not say otherwise
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Full configuration of a monitor deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub telegram: TelegramConfig,
    pub firebase: FirebaseConfig,
    pub http: HttpConfig,
    pub monitor: MonitorConfig,
    /// Reporter queue depth when running queued
    pub queue_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig::default(),
            firebase: FirebaseConfig::default(),
            http: HttpConfig::default(),
            monitor: MonitorConfig::default(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl ServiceConfig {
    /// Parse a config file without validating it
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Replace secrets with values from the command line or environment
    pub fn with_secrets(mut self, bot_token: Option<String>, firebase_auth: Option<String>) -> Self {
        if let Some(token) = bot_token {
            self.telegram.bot_token = token;
        }
        if let Some(auth) = firebase_auth {
            self.firebase.auth = auth;
        }
        self
    }

    /// Check every section
    pub fn validate(&self) -> Result<()> {
        self.telegram.validate()?;
        self.firebase.validate()?;
        self.monitor
            .validate()
            .map_err(|e| ConnectorError::Config(e.to_string()))?;

        if self.http.timeout_secs == 0 {
            return Err(ConnectorError::Config("http timeout_secs must be positive".into()));
        }
        if self.queue_capacity == 0 {
            return Err(ConnectorError::Config("queue_capacity must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL: &str = r#"{
        "telegram": { "bot_token": "123:abc", "chat_id": "42" },
        "firebase": { "host": "demo-default-rtdb.firebaseio.com", "auth": "s3cret" },
        "http": { "timeout_secs": 5 },
        "monitor": { "threshold_offset": 150, "loop_delay_ms": 250 },
        "queue_capacity": 4
    }"#;

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FULL.as_bytes()).unwrap();

        let config = ServiceConfig::load(file.path()).unwrap();

        assert_eq!(config.telegram.chat_id, "42");
        assert_eq!(config.telegram.api_base, "https://api.telegram.org");
        assert_eq!(config.firebase.state_path, "vayuveer/latest");
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.monitor.threshold_offset, 150);
        assert_eq!(config.monitor.report_interval_ms, 3000);
        assert_eq!(config.queue_capacity, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ServiceConfig::load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConnectorError::Io(_))));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            ServiceConfig::from_json("{ telegram: }"),
            Err(ConnectorError::Json(_))
        ));
    }

    #[test]
    fn test_empty_document_needs_secrets() {
        let config = ServiceConfig::from_json("{}").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert!(config.validate().is_err());

        let mut config = config.with_secrets(Some("123:abc".into()), Some("s3cret".into()));
        config.telegram.chat_id = "42".into();
        config.firebase.host = "demo-default-rtdb.firebaseio.com".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_secrets_override_file() {
        let config = ServiceConfig::from_json(FULL)
            .unwrap()
            .with_secrets(Some("999:zzz".into()), None);

        assert_eq!(config.telegram.bot_token, "999:zzz");
        assert_eq!(config.firebase.auth, "s3cret");
    }

    #[test]
    fn test_invalid_monitor_section() {
        let mut config = ServiceConfig::from_json(FULL).unwrap();
        config.monitor.threshold_offset = 0;
        assert!(matches!(config.validate(), Err(ConnectorError::Config(_))));
    }
}

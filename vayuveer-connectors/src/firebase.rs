//! Firebase Realtime Database store connector
//!
//! Two documents under the database root:
//!
//! - `<state_path>.json` is overwritten (PUT) with every state report
//! - `<threshold_path>.json` is read (GET) for the threshold override
//!
//! Both URLs carry the database secret as `?auth=<secret>`. The threshold
//! body is handed back untouched; parsing and range checks belong to the
//! core threshold synchronizer.

use std::fmt;

use serde::{Deserialize, Serialize};
use vayuveer_core::{RemoteStore, Report, ThresholdPayload};

use crate::{
    http::{HttpRequest, HttpTransport},
    redact, ConnectionStats, ConnectorError, Result,
};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Database location and secret
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirebaseConfig {
    /// Database host, e.g. `project-default-rtdb.firebaseio.com`
    pub host: String,
    /// Database secret or ID token
    pub auth: String,
    /// Document overwritten with each report
    pub state_path: String,
    /// Document holding the threshold override
    pub threshold_path: String,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            auth: String::new(),
            state_path: "vayuveer/latest".into(),
            threshold_path: "vayuveer/config/threshold".into(),
        }
    }
}

impl fmt::Debug for FirebaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseConfig")
            .field("host", &self.host)
            .field("auth", &redact(&self.auth))
            .field("state_path", &self.state_path)
            .field("threshold_path", &self.threshold_path)
            .finish()
    }
}

impl FirebaseConfig {
    pub fn new(host: impl Into<String>, auth: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            auth: auth.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.trim().is_empty() {
            return Err(ConnectorError::Config("firebase auth is empty".into()));
        }
        if self.host().is_empty() {
            return Err(ConnectorError::Config("firebase host is empty".into()));
        }
        if self.host.starts_with("http://") {
            return Err(ConnectorError::Config("firebase host must use https".into()));
        }
        for path in [&self.state_path, &self.threshold_path] {
            if path.trim_matches('/').is_empty() {
                return Err(ConnectorError::Config("firebase document path is empty".into()));
            }
        }
        Ok(())
    }

    /// Host without scheme or trailing slash
    pub fn host(&self) -> &str {
        self.host
            .strip_prefix("https://")
            .unwrap_or(&self.host)
            .trim_end_matches('/')
    }

    fn document_url(&self, path: &str) -> String {
        format!(
            "https://{}/{}.json?auth={}",
            self.host(),
            path.trim_matches('/'),
            self.auth
        )
    }

    pub(crate) fn state_url(&self) -> String {
        self.document_url(&self.state_path)
    }

    pub(crate) fn threshold_url(&self) -> String {
        self.document_url(&self.threshold_path)
    }
}

/// [`RemoteStore`] over the Firebase REST API
pub struct FirebaseStore<T> {
    config: FirebaseConfig,
    transport: T,
    stats: ConnectionStats,
}

impl<T: HttpTransport> FirebaseStore<T> {
    /// Create a store; fails on a missing host or secret
    pub fn new(config: FirebaseConfig, transport: T) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            stats: ConnectionStats::default(),
        })
    }

    pub fn config(&self) -> &FirebaseConfig {
        &self.config
    }

    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn write(&mut self, report: &Report) -> Result<usize> {
        let body = serde_json::to_string(report)?;
        let len = body.len();
        let request = HttpRequest::put(self.config.state_url(), JSON_CONTENT_TYPE, body);

        let response = self.transport.send(&request)?;
        log::info!("Firebase update response: {}", response.status);
        if !response.is_success() {
            return Err(ConnectorError::Status(response.status));
        }
        Ok(len)
    }

    fn read_threshold(&mut self) -> Result<ThresholdPayload> {
        let request = HttpRequest::get(self.config.threshold_url());

        let response = self.transport.send(&request)?;
        if response.status != 200 {
            return Err(ConnectorError::Status(response.status));
        }

        let body = response.body.trim();
        ThresholdPayload::try_from(body).map_err(|_| {
            ConnectorError::Malformed(format!(
                "threshold body of {} bytes exceeds {}",
                body.len(),
                ThresholdPayload::new().capacity()
            ))
        })
    }
}

impl<T: HttpTransport> RemoteStore for FirebaseStore<T> {
    type Error = ConnectorError;

    fn put_state(&mut self, report: &Report) -> Result<()> {
        match self.write(report) {
            Ok(bytes) => {
                self.stats.record_sent(bytes);
                Ok(())
            }
            Err(e) => {
                self.stats.record_failure(&e);
                Err(e)
            }
        }
    }

    fn fetch_threshold(&mut self) -> Result<ThresholdPayload> {
        let result = self.read_threshold();
        if let Err(e) = &result {
            self.stats.record_failure(e);
        }
        result
    }
}

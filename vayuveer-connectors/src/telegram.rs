//! Telegram chat connector
//!
//! Sends alert and all-clear messages through the Bot API `sendMessage`
//! method as a form-encoded POST. The response body is ignored; the status
//! is logged and anything outside 2xx counts as a failed delivery.

use std::fmt;

use serde::{Deserialize, Serialize};
use vayuveer_core::{encoding::percent_encode, ChatNotifier};

use crate::{
    http::{HttpRequest, HttpTransport},
    redact, ConnectionStats, ConnectorError, Result,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Bot credentials and recipient
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// API root, without a trailing slash
    pub api_base: String,
    /// Bot token as issued by BotFather
    pub bot_token: String,
    /// Recipient chat id (numeric, may be negative for groups)
    pub chat_id: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".into(),
            bot_token: String::new(),
            chat_id: String::new(),
        }
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_base", &self.api_base)
            .field("bot_token", &redact(&self.bot_token))
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            ..Self::default()
        }
    }

    /// Point at a different API root (self-hosted Bot API server)
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            return Err(ConnectorError::Config("telegram bot_token is empty".into()));
        }
        if self.chat_id.trim().is_empty() {
            return Err(ConnectorError::Config("telegram chat_id is empty".into()));
        }
        if !self.api_base.starts_with("https://") {
            return Err(ConnectorError::Config(
                "telegram api_base must start with https://".into(),
            ));
        }
        Ok(())
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        )
    }
}

/// [`ChatNotifier`] over the Telegram Bot API
pub struct TelegramNotifier<T> {
    config: TelegramConfig,
    transport: T,
    stats: ConnectionStats,
}

impl<T: HttpTransport> TelegramNotifier<T> {
    /// Create a notifier; fails on missing credentials
    pub fn new(config: TelegramConfig, transport: T) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            stats: ConnectionStats::default(),
        })
    }

    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn form_body(&self, text: &str) -> String {
        format!(
            "chat_id={}&text={}",
            percent_encode(&self.config.chat_id),
            percent_encode(text)
        )
    }
}

impl<T: HttpTransport> ChatNotifier for TelegramNotifier<T> {
    type Error = ConnectorError;

    fn send_message(&mut self, text: &str) -> Result<()> {
        let request = HttpRequest::post(
            self.config.send_message_url(),
            FORM_CONTENT_TYPE,
            self.form_body(text),
        );

        let outcome = self.transport.send(&request).and_then(|response| {
            log::info!("Telegram response: {}", response.status);
            if response.is_success() {
                Ok(())
            } else {
                Err(ConnectorError::Status(response.status))
            }
        });

        match &outcome {
            Ok(()) => self.stats.record_sent(request.body_len()),
            Err(e) => self.stats.record_failure(e),
        }
        outcome
    }
}

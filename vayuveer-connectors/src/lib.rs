//! Remote Connectors for the VayuVeer Gas-Leak Monitor
//!
//! ## Overview
//!
//! `vayuveer-core` only knows three capabilities: a chat channel
//! ([`ChatNotifier`](vayuveer_core::ChatNotifier)), a key-value store
//! ([`RemoteStore`](vayuveer_core::RemoteStore)) and a link
//! ([`Connectivity`](vayuveer_core::Connectivity)). This crate implements
//! them for a host deployment:
//!
//! | Capability     | Implementation         | Wire                                   |
//! |----------------|------------------------|----------------------------------------|
//! | Chat           | [`TelegramNotifier`]   | HTTPS POST, form body                  |
//! | Store          | [`FirebaseStore`]      | HTTPS PUT/GET, JSON, `?auth=` secret   |
//! | Link           | [`ProbeConnectivity`]  | TCP connect probe against the store    |
//!
//! ## Transport Seam
//!
//! Both HTTP connectors talk through [`HttpTransport`]. Production code uses
//! [`UreqTransport`]; tests use a recording transport and never open a
//! socket. A transport returns every HTTP status as a response and only
//! fails on transport-level problems, so each connector decides which
//! statuses count as success (the store read insists on exactly 200).
//!
//! ## Blocking vs Queued
//!
//! Connectors are synchronous. Used directly, a slow remote delays the
//! alarm loop by up to the HTTP timeout. [`QueuedRemote`] moves the calls
//! onto a dedicated reporter thread behind a bounded queue:
//!
//! ```text
//! alarm loop ──► QueuedChat / QueuedStore ──► mpsc (bounded, FIFO) ──► reporter thread ──► HTTP
//!                       ▲                                                      │
//!                       └──────────────── oneshot (threshold reply) ◄──────────┘
//! ```
//!
//! Edge reports and chat messages wait for queue space; heartbeats are
//! dropped when the queue is full.
//!
//! ## Security Considerations
//!
//! The bot token and the store secret travel in URLs. Connectors never log
//! URLs, and the config types redact secrets in their `Debug` output.
//!
//! ## Example Usage
//!
//! ```no_run
//! use vayuveer_connectors::{
//!     FirebaseConfig, FirebaseStore, HttpConfig, TelegramConfig, TelegramNotifier, UreqTransport,
//! };
//! use vayuveer_core::{ChatNotifier, RemoteStore};
//!
//! let transport = UreqTransport::new(&HttpConfig::default());
//!
//! let mut chat = TelegramNotifier::new(
//!     TelegramConfig::new("123456:token", "-1001234"),
//!     transport.clone(),
//! )?;
//! chat.send_message("hello")?;
//!
//! let mut store = FirebaseStore::new(
//!     FirebaseConfig::new("vayuveer-default-rtdb.firebaseio.com", "secret"),
//!     transport,
//! )?;
//! let body = store.fetch_threshold()?;
//! # let _ = body;
//! # Ok::<(), vayuveer_connectors::ConnectorError>(())
//! ```

pub mod config;
pub mod connectivity;
pub mod firebase;
pub mod http;
pub mod telegram;

#[cfg(feature = "std")]
pub mod queue;

// Re-export common types
pub use config::ServiceConfig;
pub use connectivity::{Probe, ProbeConnectivity, TcpProbe};
pub use firebase::{FirebaseConfig, FirebaseStore};
pub use http::{HttpConfig, HttpMethod, HttpRequest, HttpResponse, HttpTransport};
pub use telegram::{TelegramConfig, TelegramNotifier};

#[cfg(feature = "http")]
pub use http::UreqTransport;

#[cfg(feature = "std")]
pub use queue::{QueuedChat, QueuedRemote, QueuedStore, ReporterThread};

use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Reporter queue full")]
    QueueFull,

    #[error("Reporter queue closed")]
    QueueClosed,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for connector operations
pub type Result<T> = std::result::Result<T, ConnectorError>;

/// Connection statistics common to all connectors
#[derive(Debug, Default, Clone)]
pub struct ConnectionStats {
    /// Total messages sent successfully
    pub messages_sent: u64,
    /// Total messages failed to send
    pub messages_failed: u64,
    /// Total bytes sent
    pub bytes_sent: u64,
    /// Number of reconnections
    pub reconnections: u32,
    /// Last error message
    pub last_error: Option<String>,
}

impl ConnectionStats {
    pub(crate) fn record_sent(&mut self, bytes: usize) {
        self.messages_sent += 1;
        self.bytes_sent += bytes as u64;
    }

    pub(crate) fn record_failure(&mut self, error: &ConnectorError) {
        self.messages_failed += 1;
        self.last_error = Some(error.to_string());
    }

    pub(crate) fn record_reconnection(&mut self) {
        self.reconnections += 1;
    }
}

/// Redacts all but the last four characters of a secret
pub(crate) fn redact(secret: &str) -> String {
    let visible: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if secret.chars().count() <= 4 {
        "****".into()
    } else {
        format!("****{}", visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_tracking() {
        let mut stats = ConnectionStats::default();
        stats.record_sent(120);
        stats.record_sent(30);
        stats.record_failure(&ConnectorError::Status(503));

        assert_eq!(stats.messages_sent, 2);
        assert_eq!(stats.bytes_sent, 150);
        assert_eq!(stats.messages_failed, 1);
        assert_eq!(stats.last_error.as_deref(), Some("Unexpected HTTP status 503"));
    }

    #[test]
    fn test_redact() {
        assert_eq!(redact("abcdefgh"), "****efgh");
        assert_eq!(redact("abc"), "****");
        assert_eq!(redact(""), "****");
    }
}

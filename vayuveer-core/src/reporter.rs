//! Remote reporting capabilities
//!
//! Two remote services hear about the alarm:
//!
//! - a chat channel ([`ChatNotifier`]) that gets a human-readable message on
//!   every edge transition
//! - a key-value store ([`RemoteStore`]) that gets a state snapshot on every
//!   edge and heartbeat, and that also serves the threshold override
//!
//! Both are best-effort and fire-and-forget. [`Reporter`] wraps the two
//! capabilities plus the [`Connectivity`] collaborator and turns every
//! failure into a logged [`Delivery`] value; nothing here returns an error to
//! the alarm loop.
//!
//! Implementations live outside this crate (HTTP connectors on a host, the
//! radio stack on the device); tests substitute in-memory fakes.

use core::fmt::{self, Write};

use heapless::String;

use crate::{
    alarm::StatusLabel,
    constants::sensors::{MAX_CHAT_MESSAGE, MAX_THRESHOLD_BODY},
    errors::FetchError,
    time::Timestamp,
};

/// Raw threshold body as returned by the remote store
pub type ThresholdPayload = String<MAX_THRESHOLD_BODY>;

/// Formatted chat message
pub type ChatMessage = String<MAX_CHAT_MESSAGE>;

/// State snapshot written to the remote store
///
/// Serializes to `{"ppm": <2 decimals>, "status": "<label>", "timestamp": <ms>}`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Report {
    /// Pseudo-concentration (see [`crate::alarm::pseudo_ppm`])
    #[cfg_attr(feature = "serde", serde(serialize_with = "two_decimals"))]
    pub ppm: f32,
    /// Status label
    pub status: StatusLabel,
    /// Monotonic milliseconds since boot
    pub timestamp: Timestamp,
}

impl Report {
    /// Build a report; `ppm` is rounded to two decimals on serialization
    pub fn new(ppm: f32, status: StatusLabel, timestamp: Timestamp) -> Self {
        Self { ppm, status, timestamp }
    }
}

#[cfg(feature = "serde")]
fn two_decimals<S: serde::Serializer>(ppm: &f32, serializer: S) -> Result<S::Ok, S::Error> {
    let value = f64::from(*ppm);
    if !value.is_finite() {
        return serializer.serialize_f64(0.0);
    }
    serializer.serialize_f64(libm::round(value * 100.0) / 100.0)
}

/// Chat channel for human-readable alerts
pub trait ChatNotifier {
    /// Delivery failure
    type Error: fmt::Debug;

    /// Send `text` to the configured recipient
    fn send_message(&mut self, text: &str) -> Result<(), Self::Error>;
}

/// Key-value cloud store
pub trait RemoteStore {
    /// Read or write failure
    type Error: fmt::Debug;

    /// Overwrite the state snapshot
    fn put_state(&mut self, report: &Report) -> Result<(), Self::Error>;

    /// Read the threshold override body
    ///
    /// Must return `Err` for any non-200 response.
    fn fetch_threshold(&mut self) -> Result<ThresholdPayload, Self::Error>;
}

/// Network link state
pub trait Connectivity {
    /// Check if the link is usable right now
    fn is_connected(&self) -> bool;

    /// Ask the link to come back; does not block until it does
    fn reconnect(&mut self);
}

/// What happened to a best-effort delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the remote side successfully
    Sent,
    /// Link offline; nothing was attempted
    Skipped,
    /// Attempted and failed; already logged
    Failed,
}

/// Best-effort reporter over a chat channel, a store and a link
#[derive(Debug)]
pub struct Reporter<C, R, L> {
    chat: C,
    store: R,
    link: L,
}

impl<C, R, L> Reporter<C, R, L>
where
    C: ChatNotifier,
    R: RemoteStore,
    L: Connectivity,
{
    /// Wrap the three remote capabilities
    pub fn new(chat: C, store: R, link: L) -> Self {
        Self { chat, store, link }
    }

    /// Reconnect if the link is down
    pub fn ensure_link(&mut self) {
        if !self.link.is_connected() {
            log_debug!("Link down, reconnecting");
            self.link.reconnect();
        }
    }

    /// Check if the link is up
    pub fn is_online(&self) -> bool {
        self.link.is_connected()
    }

    /// Send a chat message, skipping it when offline
    pub fn notify_chat(&mut self, message: &str) -> Delivery {
        if !self.link.is_connected() {
            return Delivery::Skipped;
        }

        match self.chat.send_message(message) {
            Ok(()) => Delivery::Sent,
            Err(_e) => {
                log_warn!("Chat notification failed: {:?}", _e);
                Delivery::Failed
            }
        }
    }

    /// Write a state snapshot, skipping it when offline
    pub fn report_state(&mut self, report: &Report) -> Delivery {
        if !self.link.is_connected() {
            return Delivery::Skipped;
        }

        match self.store.put_state(report) {
            Ok(()) => Delivery::Sent,
            Err(_e) => {
                log_warn!("State report {} failed: {:?}", report.status.as_str(), _e);
                Delivery::Failed
            }
        }
    }

    /// Read the threshold override, `Offline` when the link is down
    pub fn fetch_threshold(&mut self) -> Result<ThresholdPayload, FetchError<R::Error>> {
        if !self.link.is_connected() {
            return Err(FetchError::Offline);
        }
        self.store.fetch_threshold().map_err(FetchError::Remote)
    }

    /// Chat notifier
    pub fn chat(&self) -> &C {
        &self.chat
    }

    /// Chat notifier, mutably
    pub fn chat_mut(&mut self) -> &mut C {
        &mut self.chat
    }

    /// Remote store
    pub fn store(&self) -> &R {
        &self.store
    }

    /// Remote store, mutably
    pub fn store_mut(&mut self) -> &mut R {
        &mut self.store
    }

    /// Link-state source
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Link-state source, mutably
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Take the collaborators back
    pub fn into_parts(self) -> (C, R, L) {
        (self.chat, self.store, self.link)
    }
}

/// Chat text sent on entering ALERT
pub fn alert_message(ppm: f32) -> ChatMessage {
    let mut msg = ChatMessage::new();
    // Fits comfortably: the fixed text is ~50 bytes and ppm tops out at 3300.0
    let _ = write!(msg, "🚨 *VayuVeer ALERT!* LPG detected.\nPPM: {:.1}", ppm);
    msg
}

/// Chat text sent on returning to SAFE
pub fn all_clear_message() -> ChatMessage {
    let mut msg = ChatMessage::new();
    let _ = msg.push_str("✅ *VayuVeer SAFE:* LPG levels normal again.");
    msg
}

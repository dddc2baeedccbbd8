//! # `Envelope` Transport Wrapper
//!
//! The outer wrapper for every message delivered on the host bus.
//!
//! ## Properties
//!
//! - **Versioning**: All envelopes include a `version` field for forward compatibility.
//! - **Envelope Authority**: `source_app_id` is the sole source of truth for
//!   where a reply to this message must be routed.
//! - **Opaque Payload**: The envelope never inspects its payload.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// The message envelope for all bus communication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Protocol version for forward compatibility.
    pub version: u16,

    /// Unique id of this delivery.
    pub message_id: Uuid,

    /// The app that sent this message. Replies are routed here.
    pub source_app_id: String,

    /// The app this message is addressed to.
    pub destination_app_id: String,

    /// Unix timestamp (ms) when the envelope was created.
    pub sent_at: u64,

    /// The actual message payload.
    pub payload: T,
}

impl<T> Envelope<T> {
    /// Current protocol version.
    pub const CURRENT_VERSION: u16 = 1;

    /// Wrap `payload` for delivery from `source_app_id` to `destination_app_id`.
    pub fn new(
        source_app_id: impl Into<String>,
        destination_app_id: impl Into<String>,
        payload: T,
    ) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            message_id: Uuid::new_v4(),
            source_app_id: source_app_id.into(),
            destination_app_id: destination_app_id.into(),
            sent_at: now_millis(),
            payload,
        }
    }

    /// Re-wrap with a different payload, keeping the routing header.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            version: self.version,
            message_id: self.message_id,
            source_app_id: self.source_app_id,
            destination_app_id: self.destination_app_id,
            sent_at: self.sent_at,
            payload: f(self.payload),
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

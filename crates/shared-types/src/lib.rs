//! # Shared Types Crate
//!
//! This crate contains the message formats, the `Envelope<T>` transport
//! wrapper, and the well-known application identifiers shared by every
//! participant on the host message bus.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-app message shapes are defined here.
//! - **Envelope Authority**: The envelope's `source_app_id` decides where a
//!   reply is routed. Payload fields (such as `RequestHeader::app_id`) may be
//!   rewritten by plugins and are never used for routing.
//! - **Tracking**: Every request carries a `tracking_id` unique to that request
//!   instance; its reply echoes the same value.

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod ipc;

pub use entities::*;
pub use envelope::Envelope;
pub use errors::*;
pub use ipc::*;

/// Well-known application identifiers on the host message bus.
pub mod app_ids {
    /// The sensor host service.
    pub const HOSTSVC_SENSOR: &str = "hostsvc-sensor";

    /// The downstream message tasking platform service.
    pub const PLATFORM_MTS: &str = "platform-mts";
}

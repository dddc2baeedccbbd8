//! # Error Types
//!
//! Defines error types shared by bus participants.

use thiserror::Error;

/// Errors related to envelope validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessageError {
    /// Envelope version not supported.
    #[error("Unsupported version: received {received}, supported {supported}")]
    UnsupportedVersion { received: u16, supported: u16 },

    /// Envelope carries no source app id, so no reply can be routed.
    #[error("Envelope has no source app id")]
    MissingSource,

    /// Envelope carries no destination app id.
    #[error("Envelope has no destination app id")]
    MissingDestination,
}

/// Validate the routing header of an envelope.
pub fn validate_envelope<T>(envelope: &crate::Envelope<T>) -> Result<(), MessageError> {
    if envelope.version != crate::Envelope::<T>::CURRENT_VERSION {
        return Err(MessageError::UnsupportedVersion {
            received: envelope.version,
            supported: crate::Envelope::<T>::CURRENT_VERSION,
        });
    }
    if envelope.source_app_id.is_empty() {
        return Err(MessageError::MissingSource);
    }
    if envelope.destination_app_id.is_empty() {
        return Err(MessageError::MissingDestination);
    }
    Ok(())
}

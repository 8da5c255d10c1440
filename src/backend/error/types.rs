/**
 * Backend Error Types
 *
 * This module defines the error taxonomy for the chat subsystem.
 * Each variant carries enough context to decide what happens to the
 * offending connection and what, if anything, the sender is told.
 *
 * # Severity
 *
 * Not every error costs the connection its transport:
 *
 * - `HandshakeViolation` closes the transport with a policy-violation
 *   close code; the connection is never registered.
 * - `MalformedFrame` wrapping a serialization failure closes the
 *   transport (the peer is not speaking JSON); wrapping a validation
 *   failure it is answered with an error ack and the connection stays up.
 * - `UnknownRecipient` and `Persistence` are always local: the sender is
 *   acknowledged and the connection stays up.
 */

use thiserror::Error;

use crate::backend::store::StoreError;
use crate::shared::SharedError;

/// Chat subsystem error taxonomy
///
/// # Usage
///
/// ```rust
/// use aiderchat::backend::error::ChatError;
///
/// // Create a handshake violation
/// let err = ChatError::handshake("first frame did not carry a user_id");
///
/// // Create an unknown-recipient error
/// let err = ChatError::unknown_recipient("u404");
/// ```
#[derive(Debug, Error)]
pub enum ChatError {
    /// Malformed or missing identity frame
    ///
    /// The transport is closed with a policy-violation signal and no
    /// registry entry is ever created.
    #[error("Handshake violation: {reason}")]
    HandshakeViolation {
        /// Why the handshake was rejected
        reason: String,
    },

    /// Un-parseable or invalid chat frame
    ///
    /// Wraps the underlying parse/validation failure. Never fatal to the
    /// router or to other connections.
    #[error("Malformed frame: {source}")]
    MalformedFrame {
        #[from]
        source: SharedError,
    },

    /// Recipient id matches neither a known individual nor a configured group
    ///
    /// The request is rejected, the sender is notified, nothing is persisted.
    #[error("Unknown recipient: {id}")]
    UnknownRecipient {
        /// The unrecognized recipient id
        id: String,
    },

    /// A history gateway operation failed
    ///
    /// Live delivery already attempted is not rolled back; the failure is
    /// logged and surfaced to the sender as an acknowledgment.
    #[error("Persistence failure: {source}")]
    Persistence {
        #[from]
        source: StoreError,
    },
}

impl ChatError {
    /// Create a new handshake violation
    pub fn handshake(reason: impl Into<String>) -> Self {
        Self::HandshakeViolation {
            reason: reason.into(),
        }
    }

    /// Create a new unknown-recipient error
    pub fn unknown_recipient(id: impl Into<String>) -> Self {
        Self::UnknownRecipient { id: id.into() }
    }

    /// Whether this error should cost the connection its transport
    ///
    /// Handshake violations always do. A malformed frame does only when
    /// the text was not JSON at all; a structurally valid frame with a bad
    /// field is answered with an ack instead.
    pub fn is_fatal_to_connection(&self) -> bool {
        match self {
            Self::HandshakeViolation { .. } => true,
            Self::MalformedFrame {
                source: SharedError::SerializationError { .. },
            } => true,
            Self::MalformedFrame { .. } => false,
            Self::UnknownRecipient { .. } => false,
            Self::Persistence { .. } => false,
        }
    }
}

//! Chat Wire Frames
//!
//! This module defines the JSON frames exchanged over a chat WebSocket and
//! the validation that turns raw text into typed frames.
//!
//! # Frame Kinds
//!
//! - `HandshakeFrame` - the first frame a client must send, binding the
//!   transport to a participant identity
//! - `ChatFrame` - an inbound chat message (client never controls `sender`)
//! - `OutboundFrame` - a chat message as fanned out to recipients, with the
//!   server-assigned `sender`
//! - `ErrorAck` - an error acknowledgment sent back to the offending sender
//!
//! # Validation
//!
//! Parsing is a pure function from text to `Result`: callers decide what a
//! failure means for the connection. A frame that is not valid JSON reports
//! a `SerializationError`; a JSON frame with a missing or invalid field
//! reports a `ValidationError` naming the field.

use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;

/// Maximum accepted chat content length, matching the stored schema bound.
pub const MAX_CONTENT_LEN: usize = 1000;

/// The identity-binding frame, first frame on every connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandshakeFrame {
    /// Participant id to bind this transport to
    pub user_id: String,
}

impl HandshakeFrame {
    /// Parse and validate a handshake frame from raw text
    ///
    /// The frame must be a JSON object with a non-empty string `user_id`.
    /// Anything else is a protocol violation and the caller is expected to
    /// close the transport without registering it.
    pub fn parse(text: &str) -> Result<Self, SharedError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let user_id = value
            .get("user_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SharedError::validation("user_id", "missing or not a string"))?;
        if user_id.is_empty() {
            return Err(SharedError::validation("user_id", "must not be empty"));
        }
        Ok(Self {
            user_id: user_id.to_string(),
        })
    }
}

/// An inbound chat frame
///
/// A client-supplied `sender` field, if present, is discarded: the sender
/// is always the identity bound at handshake time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatFrame {
    /// Individual participant id or well-known group id
    pub recipient: String,
    /// Message text
    pub content: String,
    /// Optional id of the message this one replies to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_to: Option<String>,
}

impl ChatFrame {
    /// Parse and validate a chat frame from raw text
    ///
    /// # Errors
    ///
    /// - `SerializationError` if `text` is not valid JSON (severe: the
    ///   connection is speaking garbage)
    /// - `ValidationError` if the JSON is an object but `recipient` or
    ///   `content` is missing, empty, or over the length bound (local:
    ///   answered with an error ack, connection stays up)
    pub fn parse(text: &str) -> Result<Self, SharedError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let obj = value
            .as_object()
            .ok_or_else(|| SharedError::validation("frame", "expected a JSON object"))?;

        let recipient = obj
            .get("recipient")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SharedError::validation("recipient", "missing or not a string"))?;
        if recipient.is_empty() {
            return Err(SharedError::validation("recipient", "must not be empty"));
        }

        let content = obj
            .get("content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SharedError::validation("content", "missing or not a string"))?;
        if content.is_empty() {
            return Err(SharedError::validation("content", "must not be empty"));
        }
        if content.chars().count() > MAX_CONTENT_LEN {
            return Err(SharedError::validation(
                "content",
                format!("exceeds maximum length of {} characters", MAX_CONTENT_LEN),
            ));
        }

        let response_to = match obj.get("response_to") {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(SharedError::validation("response_to", "not a string"));
            }
        };

        Ok(Self {
            recipient: recipient.to_string(),
            content: content.to_string(),
            response_to,
        })
    }
}

/// A chat frame as delivered to recipients, with the server-assigned sender
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutboundFrame {
    /// Handshake-bound id of the author
    pub sender: String,
    /// Individual participant id or group id this was addressed to
    pub recipient: String,
    /// Message text
    pub content: String,
    /// Optional id of the message this one replies to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_to: Option<String>,
}

impl OutboundFrame {
    /// Stamp an inbound frame with the authenticated sender
    pub fn from_inbound(sender: impl Into<String>, frame: &ChatFrame) -> Self {
        Self {
            sender: sender.into(),
            recipient: frame.recipient.clone(),
            content: frame.content.clone(),
            response_to: frame.response_to.clone(),
        }
    }
}

/// Error acknowledgment sent back to the sender of a failed frame
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorAck {
    /// Always `"error"`
    pub status: String,
    /// Human-readable reason
    pub message: String,
}

impl ErrorAck {
    /// Create a new error acknowledgment
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

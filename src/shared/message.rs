//! Chat Message Data Structure
//!
//! Represents a durably stored chat message. The `sender` is always the
//! handshake-bound participant id; the `recipient` is either an individual
//! participant id or a well-known group id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message id, assigned by the history gateway on insert
    pub id: Uuid,
    /// Participant id of the author (server-assigned, never client-supplied)
    pub sender: String,
    /// Individual participant id or group id this was addressed to
    pub recipient: String,
    /// Message text
    pub content: String,
    /// When the message was persisted
    pub created: DateTime<Utc>,
    /// Optional id of the message this one replies to
    pub response_to: Option<String>,
}

/// A message about to be persisted, before the gateway assigns id/created
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewMessage {
    /// Participant id of the author
    pub sender: String,
    /// Individual participant id or group id
    pub recipient: String,
    /// Message text
    pub content: String,
    /// Optional id of the message this one replies to
    pub response_to: Option<String>,
}

impl NewMessage {
    /// Build a record for persistence from an authenticated sender and the
    /// validated inbound frame fields
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        content: impl Into<String>,
        response_to: Option<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            content: content.into(),
            response_to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_round_trips_through_json() {
        let msg = Message {
            id: Uuid::new_v4(),
            sender: "u1".to_string(),
            recipient: "explicit-quitters".to_string(),
            content: "hello there".to_string(),
            created: Utc::now(),
            response_to: None,
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }
}

//! Storage trait definitions
//!
//! The operations the message router needs from the conversation history
//! store and the identity directory. Everything else about persistence is
//! an implementation detail behind these traits.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::{Message, NewMessage};

/// Errors produced by storage adapters
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The adapter is not able to serve requests
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Append-only store of chat messages plus profile chat-log rosters
#[async_trait]
pub trait HistoryGateway: Send + Sync {
    /// Persist a message; the gateway assigns `id` and `created`
    async fn insert(&self, message: NewMessage) -> Result<Message, StoreError>;

    /// All messages addressed to `recipient`, ordered by creation time
    async fn find_by_recipient(&self, recipient: &str) -> Result<Vec<Message>, StoreError>;

    /// Append a message id to the chat-log roster on `owner_id`'s profile
    /// document (a group's identity document or a user's profile)
    async fn append_chat_log(&self, owner_id: &str, message_id: Uuid) -> Result<(), StoreError>;
}

/// Lookup against the external identity store
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Whether `participant_id` names a known user or councilor
    async fn recipient_exists(&self, participant_id: &str) -> Result<bool, StoreError>;
}

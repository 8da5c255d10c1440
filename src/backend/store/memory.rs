//! In-memory storage adapters
//!
//! Mutex-guarded implementations of the storage traits. Used as the
//! degraded-mode fallback when no database is configured (messages are
//! lost on restart) and as the double for router tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::backend::store::gateway::{HistoryGateway, IdentityDirectory, StoreError};
use crate::shared::{Message, NewMessage};

/// In-memory history gateway
#[derive(Default)]
pub struct MemoryHistoryGateway {
    messages: Mutex<Vec<Message>>,
    chat_logs: Mutex<HashMap<String, Vec<Uuid>>>,
    /// When set, every write fails with this message (test hook for the
    /// persistence-failure path)
    fail_writes: Mutex<Option<String>>,
}

impl MemoryHistoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail, simulating a storage outage
    pub fn fail_writes_with(&self, reason: impl Into<String>) {
        *self.fail_writes.lock().unwrap() = Some(reason.into());
    }

    /// All persisted messages, in insertion order
    pub fn all_messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }

    /// The chat-log roster recorded for `owner_id`
    pub fn chat_log(&self, owner_id: &str) -> Vec<Uuid> {
        self.chat_logs
            .lock()
            .unwrap()
            .get(owner_id)
            .cloned()
            .unwrap_or_default()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        match self.fail_writes.lock().unwrap().as_ref() {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl HistoryGateway for MemoryHistoryGateway {
    async fn insert(&self, message: NewMessage) -> Result<Message, StoreError> {
        self.check_writable()?;
        let stored = Message {
            id: Uuid::new_v4(),
            sender: message.sender,
            recipient: message.recipient,
            content: message.content,
            created: Utc::now(),
            response_to: message.response_to,
        };
        self.messages.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn find_by_recipient(&self, recipient: &str) -> Result<Vec<Message>, StoreError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.recipient == recipient)
            .cloned()
            .collect())
    }

    async fn append_chat_log(&self, owner_id: &str, message_id: Uuid) -> Result<(), StoreError> {
        self.check_writable()?;
        self.chat_logs
            .lock()
            .unwrap()
            .entry(owner_id.to_string())
            .or_default()
            .push(message_id);
        Ok(())
    }
}

/// In-memory identity directory
///
/// Either a fixed set of known ids (tests) or permissive (degraded-mode
/// production fallback, where the real directory is unreachable and
/// rejecting everyone would be worse than rejecting no one).
pub struct MemoryIdentityDirectory {
    known: Mutex<HashSet<String>>,
    allow_all: bool,
}

impl MemoryIdentityDirectory {
    /// Directory that knows exactly the given ids
    pub fn with_known<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known: Mutex::new(ids.into_iter().map(Into::into).collect()),
            allow_all: false,
        }
    }

    /// Directory that treats every id as known
    pub fn permissive() -> Self {
        Self {
            known: Mutex::new(HashSet::new()),
            allow_all: true,
        }
    }

    /// Register another known id
    pub fn add(&self, id: impl Into<String>) {
        self.known.lock().unwrap().insert(id.into());
    }
}

#[async_trait]
impl IdentityDirectory for MemoryIdentityDirectory {
    async fn recipient_exists(&self, participant_id: &str) -> Result<bool, StoreError> {
        if self.allow_all {
            return Ok(true);
        }
        Ok(self.known.lock().unwrap().contains(participant_id))
    }
}

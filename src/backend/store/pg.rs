//! Database operations for chat history
//!
//! PostgreSQL implementations of the history gateway and identity
//! directory. Messages live in a `messages` table; chat-log rosters live
//! as a uuid array on `profiles`; the directory checks the `users` and
//! `councilors` tables the identity service maintains.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::backend::store::gateway::{HistoryGateway, IdentityDirectory, StoreError};
use crate::shared::{Message, NewMessage};

/// History gateway backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgHistoryGateway {
    pool: PgPool,
}

impl PgHistoryGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryGateway for PgHistoryGateway {
    async fn insert(&self, message: NewMessage) -> Result<Message, StoreError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO messages (id, sender, recipient, content, created, response_to)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(&message.sender)
        .bind(&message.recipient)
        .bind(&message.content)
        .bind(now)
        .bind(&message.response_to)
        .execute(&self.pool)
        .await?;

        Ok(Message {
            id,
            sender: message.sender,
            recipient: message.recipient,
            content: message.content,
            created: now,
            response_to: message.response_to,
        })
    }

    async fn find_by_recipient(&self, recipient: &str) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, sender, recipient, content, created, response_to
            FROM messages
            WHERE recipient = $1
            ORDER BY created ASC
            "#,
        )
        .bind(recipient)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Message {
                id: row.get("id"),
                sender: row.get("sender"),
                recipient: row.get("recipient"),
                content: row.get("content"),
                created: row.get("created"),
                response_to: row.get("response_to"),
            })
            .collect())
    }

    async fn append_chat_log(&self, owner_id: &str, message_id: Uuid) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (participant_id, chats)
            VALUES ($1, ARRAY[$2]::uuid[])
            ON CONFLICT (participant_id)
            DO UPDATE SET chats = array_append(profiles.chats, $2)
            "#,
        )
        .bind(owner_id)
        .bind(message_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Identity directory backed by the users/councilors tables
#[derive(Clone)]
pub struct PgIdentityDirectory {
    pool: PgPool,
}

impl PgIdentityDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityDirectory for PgIdentityDirectory {
    async fn recipient_exists(&self, participant_id: &str) -> Result<bool, StoreError> {
        // A recipient may be a regular user or a councilor
        let row = sqlx::query(
            r#"
            SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)
                OR EXISTS (SELECT 1 FROM councilors WHERE id = $1)
                AS known
            "#,
        )
        .bind(participant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("known"))
    }
}

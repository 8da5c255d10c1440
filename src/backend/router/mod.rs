//! Message Router
//!
//! Consumes inbound frames from a registered connection, classifies the
//! target as an individual or a named group, computes the delivery set by
//! combining registry state with conversation history, dispatches, and
//! commits the persistence side-effects.
//!
//! # Delivery vs. Persistence
//!
//! For a single inbound message, live delivery and persistence are not
//! atomic with respect to each other. Delivery is attempted first and is
//! never blocked waiting for a write; a failed write is logged and
//! surfaced to the sender as an acknowledgment, never rolled back.
//!
//! # Group Fan-Out
//!
//! The delivery set for a group message is the set intersection of the
//! currently connected participants and the group's historical
//! participants (distinct senders of prior messages addressed to the
//! group). Whether the sender receives their own message back is the
//! `echo_to_sender` policy flag, decided in configuration rather than
//! inferred from the set math.

pub mod recipient;

pub use recipient::Recipient;

use std::collections::HashSet;
use std::sync::Arc;

use crate::backend::error::ChatError;
use crate::backend::registry::ConnectionRegistry;
use crate::backend::store::{HistoryGateway, IdentityDirectory};
use crate::shared::config::ChatConfig;
use crate::shared::frame::{ChatFrame, ErrorAck, OutboundFrame};
use crate::shared::message::NewMessage;

/// Routes inbound chat frames to live recipients and the history gateway
///
/// Cheap to clone; all clones share the same registry and adapters.
#[derive(Clone)]
pub struct MessageRouter {
    registry: ConnectionRegistry,
    history: Arc<dyn HistoryGateway>,
    directory: Arc<dyn IdentityDirectory>,
    config: ChatConfig,
}

impl MessageRouter {
    pub fn new(
        registry: ConnectionRegistry,
        history: Arc<dyn HistoryGateway>,
        directory: Arc<dyn IdentityDirectory>,
        config: ChatConfig,
    ) -> Self {
        Self {
            registry,
            history,
            directory,
            config,
        }
    }

    /// Handle one validated inbound frame from the connection bound to
    /// `bound_id`
    ///
    /// The sender of the resulting message is always `bound_id`; any
    /// client-supplied sender was already discarded during frame parsing.
    /// Errors returned here are local to the offending connection.
    pub async fn handle_inbound(&self, bound_id: &str, frame: ChatFrame) -> Result<(), ChatError> {
        match Recipient::classify(&frame.recipient, &self.config) {
            Recipient::Group(group_id) => self.handle_group(bound_id, &group_id, frame).await,
            Recipient::Individual(participant_id) => {
                self.handle_individual(bound_id, &participant_id, frame).await
            }
        }
    }

    /// Group path: fan out to live historical participants, then persist
    async fn handle_group(
        &self,
        bound_id: &str,
        group_id: &str,
        frame: ChatFrame,
    ) -> Result<(), ChatError> {
        let past_conversations = self.history.find_by_recipient(group_id).await?;
        let historical_participants: HashSet<String> = past_conversations
            .into_iter()
            .map(|message| message.sender)
            .collect();

        let live = self.registry.snapshot_ids();
        let mut recipients: HashSet<&String> =
            live.intersection(&historical_participants).collect();
        if !self.config.echo_to_sender {
            recipients.retain(|id| id.as_str() != bound_id);
        }

        tracing::info!(
            "[Router] Group {} fan-out from {}: {} recipient(s)",
            group_id,
            bound_id,
            recipients.len()
        );

        let outbound = OutboundFrame::from_inbound(bound_id, &frame);
        for participant_id in recipients {
            self.registry.send(participant_id, &outbound);
        }

        let stored = self
            .history
            .insert(NewMessage::new(
                bound_id,
                group_id,
                frame.content,
                frame.response_to,
            ))
            .await?;

        // Side record on the group's own identity document; a failure here
        // must not undo a message that was already delivered and stored
        if let Err(e) = self.history.append_chat_log(group_id, stored.id).await {
            tracing::warn!(
                "[Router] Failed to append message {} to group {} chat log: {}",
                stored.id,
                group_id,
                e
            );
        }

        Ok(())
    }

    /// Individual path: best-effort direct delivery, then persist
    async fn handle_individual(
        &self,
        bound_id: &str,
        recipient_id: &str,
        frame: ChatFrame,
    ) -> Result<(), ChatError> {
        // Strict variant: an id matching no known user or councilor fails
        // the whole request before anything is delivered or persisted
        if !self.directory.recipient_exists(recipient_id).await? {
            return Err(ChatError::unknown_recipient(recipient_id));
        }

        let outbound = OutboundFrame::from_inbound(bound_id, &frame);
        if self.registry.send(recipient_id, &outbound) {
            tracing::debug!("[Router] Delivered to {}", recipient_id);
        } else {
            // Not an error: the message is still persisted below
            tracing::debug!("[Router] {} not connected, notifying sender", recipient_id);
            self.registry.send(
                bound_id,
                &ErrorAck::new(format!("Recipient {} is not connected", recipient_id)),
            );
        }

        let stored = self
            .history
            .insert(NewMessage::new(
                bound_id,
                recipient_id,
                frame.content,
                frame.response_to,
            ))
            .await?;

        // Both ends of the conversation track the message on their profiles
        for owner in [recipient_id, bound_id] {
            if let Err(e) = self.history.append_chat_log(owner, stored.id).await {
                tracing::warn!(
                    "[Router] Failed to append message {} to {} chat log: {}",
                    stored.id,
                    owner,
                    e
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::{MemoryHistoryGateway, MemoryIdentityDirectory};
    use tokio::sync::mpsc;

    fn router_with(
        registry: &ConnectionRegistry,
        history: Arc<MemoryHistoryGateway>,
        known: &[&str],
    ) -> MessageRouter {
        MessageRouter::new(
            registry.clone(),
            history,
            Arc::new(MemoryIdentityDirectory::with_known(known.iter().copied())),
            ChatConfig::default(),
        )
    }

    fn frame(recipient: &str, content: &str) -> ChatFrame {
        ChatFrame {
            recipient: recipient.to_string(),
            content: content.to_string(),
            response_to: None,
        }
    }

    #[tokio::test]
    async fn test_unknown_recipient_persists_nothing() {
        let registry = ConnectionRegistry::new();
        let history = Arc::new(MemoryHistoryGateway::new());
        let router = router_with(&registry, history.clone(), &["u1"]);

        let result = router.handle_inbound("u1", frame("u404", "hi")).await;
        assert!(matches!(result, Err(ChatError::UnknownRecipient { .. })));
        assert!(history.all_messages().is_empty());
    }

    #[tokio::test]
    async fn test_offline_recipient_still_persists() {
        let registry = ConnectionRegistry::new();
        let history = Arc::new(MemoryHistoryGateway::new());
        let router = router_with(&registry, history.clone(), &["u1", "u2"]);

        // u1 is connected so it can receive the miss ack
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.connect("u1", tx);

        router.handle_inbound("u1", frame("u2", "hi")).await.unwrap();

        let messages = history.all_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].recipient, "u2");
        assert_eq!(messages[0].sender, "u1");

        // Sender got the delivery-miss ack
        let ack = match rx.recv().await.unwrap() {
            crate::backend::registry::Outbound::Frame(text) => text,
            other => panic!("expected ack frame, got {:?}", other),
        };
        assert!(ack.contains("error"));
        assert!(ack.contains("u2"));
    }

    #[tokio::test]
    async fn test_insert_failure_after_group_delivery_is_local_error() {
        let registry = ConnectionRegistry::new();
        let history = Arc::new(MemoryHistoryGateway::new());
        // u2 becomes a historical participant of the group
        history
            .insert(NewMessage::new("u2", "grass-quitters", "earlier", None))
            .await
            .unwrap();
        let router = router_with(&registry, history.clone(), &["u1", "u2"]);

        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.connect("u2", tx);

        history.fail_writes_with("outage");
        let result = router
            .handle_inbound("u1", frame("grass-quitters", "hi"))
            .await;
        assert!(matches!(result, Err(ChatError::Persistence { .. })));

        // Delivery already happened and is not rolled back
        let delivered = match rx.recv().await.unwrap() {
            crate::backend::registry::Outbound::Frame(text) => text,
            other => panic!("expected delivered frame, got {:?}", other),
        };
        assert!(delivered.contains("\"sender\":\"u1\""));
    }
}

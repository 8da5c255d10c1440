//! Shared test harness
//!
//! Wires a real connection registry and message router to the in-memory
//! storage adapters, with participant channels observable from the test.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use aiderchat::backend::error::ChatError;
use aiderchat::backend::registry::{ConnectionRegistry, Outbound};
use aiderchat::backend::router::MessageRouter;
use aiderchat::backend::store::{MemoryHistoryGateway, MemoryIdentityDirectory};
use aiderchat::shared::config::ChatConfig;
use aiderchat::shared::frame::ChatFrame;

pub struct TestHarness {
    pub registry: ConnectionRegistry,
    pub history: Arc<MemoryHistoryGateway>,
    pub directory: Arc<MemoryIdentityDirectory>,
    pub router: MessageRouter,
}

impl TestHarness {
    /// Harness with default config (echo_to_sender = true)
    pub fn new() -> Self {
        Self::with_config(ChatConfig::default())
    }

    /// Harness with a specific echo policy
    pub fn with_echo_policy(echo_to_sender: bool) -> Self {
        Self::with_config(
            ChatConfig::builder()
                .echo_to_sender(echo_to_sender)
                .build()
                .unwrap(),
        )
    }

    pub fn with_config(config: ChatConfig) -> Self {
        let registry = ConnectionRegistry::new();
        let history = Arc::new(MemoryHistoryGateway::new());
        let directory = Arc::new(MemoryIdentityDirectory::with_known(Vec::<String>::new()));
        let router = MessageRouter::new(
            registry.clone(),
            history.clone(),
            directory.clone(),
            config,
        );
        Self {
            registry,
            history,
            directory,
            router,
        }
    }

    /// Register `id` as a known participant and connect a live channel,
    /// returning the receiving end of its outbound queue
    pub fn connect(&self, id: &str) -> UnboundedReceiver<Outbound> {
        self.directory.add(id);
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        self.registry.connect(id, tx);
        rx
    }

    /// Register `id` as known without connecting it
    pub fn know(&self, id: &str) {
        self.directory.add(id);
    }

    /// Route one message as if it arrived on `sender`'s connection
    pub async fn send(
        &self,
        sender: &str,
        recipient: &str,
        content: &str,
    ) -> Result<(), ChatError> {
        let frame = ChatFrame {
            recipient: recipient.to_string(),
            content: content.to_string(),
            response_to: None,
        };
        self.router.handle_inbound(sender, frame).await
    }
}

/// Drain every frame currently queued on a channel, parsed as JSON
pub fn drain_frames(rx: &mut UnboundedReceiver<Outbound>) -> Vec<serde_json::Value> {
    let mut frames = Vec::new();
    while let Ok(item) = rx.try_recv() {
        if let Outbound::Frame(text) = item {
            frames.push(serde_json::from_str(&text).unwrap());
        }
    }
    frames
}

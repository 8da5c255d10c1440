/**
 * Connection Table
 *
 * The registry's internal synchronized table. Mutating operations
 * (`connect`, `disconnect`, `release`) and the read operation
 * (`snapshot_ids`) are mutually exclusive at the granularity of a single
 * table mutation; delivery never happens under the lock.
 */

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::ws::CloseFrame;
use serde::Serialize;
use tokio::sync::mpsc;

/// An item queued for a connection's writer task
#[derive(Debug, Clone)]
pub enum Outbound {
    /// A serialized JSON frame to send as a text message
    Frame(String),
    /// Close the socket with an optional close frame and terminate
    Close(Option<CloseFrame>),
}

/// Sending half of a connection's outbound channel
pub type ConnectionSender = mpsc::UnboundedSender<Outbound>;

struct Entry {
    tx: ConnectionSender,
    serial: u64,
}

/// Process-wide table of live participant connections
///
/// Cheap to clone; all clones share the same table.
#[derive(Clone)]
pub struct ConnectionRegistry {
    inner: Arc<Mutex<HashMap<String, Entry>>>,
    next_serial: Arc<AtomicU64>,
}

impl ConnectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            next_serial: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Register a channel under `participant_id`, returning the registration serial
    ///
    /// If an entry already exists for that id, the previous channel is
    /// closed and replaced (last-connect-wins). No error is raised for
    /// replacement.
    pub fn connect(&self, participant_id: &str, tx: ConnectionSender) -> u64 {
        let serial = self.next_serial.fetch_add(1, Ordering::Relaxed);
        let displaced = {
            let mut table = self.inner.lock().expect("registry lock poisoned");
            table.insert(participant_id.to_string(), Entry { tx, serial })
        };
        if let Some(old) = displaced {
            tracing::info!(
                "[Registry] Displacing previous connection for {}",
                participant_id
            );
            let _ = old.tx.send(Outbound::Close(Some(CloseFrame {
                code: 1000,
                reason: "superseded by a newer connection".into(),
            })));
        }
        tracing::debug!("[Registry] {} connected (serial {})", participant_id, serial);
        serial
    }

    /// Remove and close the entry for `participant_id`, if any
    ///
    /// Idempotent: removing an absent id is a no-op.
    pub fn disconnect(&self, participant_id: &str) {
        let removed = {
            let mut table = self.inner.lock().expect("registry lock poisoned");
            table.remove(participant_id)
        };
        if let Some(entry) = removed {
            let _ = entry.tx.send(Outbound::Close(None));
            tracing::debug!("[Registry] {} disconnected", participant_id);
        }
    }

    /// Remove the entry for `participant_id` only if `serial` still matches
    ///
    /// Used by a connection's own cleanup path. A connection that was
    /// displaced by a newer registration finds a different serial here and
    /// leaves the replacement entry alone.
    pub fn release(&self, participant_id: &str, serial: u64) {
        let mut table = self.inner.lock().expect("registry lock poisoned");
        if table.get(participant_id).is_some_and(|e| e.serial == serial) {
            table.remove(participant_id);
            tracing::debug!("[Registry] {} released (serial {})", participant_id, serial);
        }
    }

    /// Best-effort delivery of a JSON payload to one participant
    ///
    /// Returns `true` if the frame was enqueued for a live entry. A missing
    /// entry is a no-op, not an error: callers that need delivery
    /// confirmation must check membership first or accept silent drops.
    pub fn send(&self, participant_id: &str, payload: &impl Serialize) -> bool {
        let text = match serde_json::to_string(payload) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("[Registry] Failed to serialize outbound frame: {}", e);
                return false;
            }
        };
        let tx = {
            let table = self.inner.lock().expect("registry lock poisoned");
            match table.get(participant_id) {
                Some(entry) => entry.tx.clone(),
                None => return false,
            }
        };
        tx.send(Outbound::Frame(text)).is_ok()
    }

    /// A consistent point-in-time view of currently connected participant ids
    pub fn snapshot_ids(&self) -> HashSet<String> {
        let table = self.inner.lock().expect("registry lock poisoned");
        table.keys().cloned().collect()
    }

    /// Whether `participant_id` currently has a live entry
    pub fn is_connected(&self, participant_id: &str) -> bool {
        let table = self.inner.lock().expect("registry lock poisoned");
        table.contains_key(participant_id)
    }

    /// Number of live connections
    pub fn connection_count(&self) -> usize {
        let table = self.inner.lock().expect("registry lock poisoned");
        table.len()
    }

    /// Best-effort delivery of a JSON payload to every live channel
    ///
    /// Errors on individual channels are isolated and do not abort the
    /// broadcast. Returns the number of channels the frame was enqueued for.
    pub fn broadcast(&self, payload: &impl Serialize) -> usize {
        let text = match serde_json::to_string(payload) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("[Registry] Failed to serialize broadcast frame: {}", e);
                return 0;
            }
        };
        let senders: Vec<(String, ConnectionSender)> = {
            let table = self.inner.lock().expect("registry lock poisoned");
            table
                .iter()
                .map(|(id, entry)| (id.clone(), entry.tx.clone()))
                .collect()
        };
        let mut delivered = 0;
        for (id, tx) in senders {
            if tx.send(Outbound::Frame(text.clone())).is_ok() {
                delivered += 1;
            } else {
                tracing::debug!("[Registry] Broadcast skipped closed channel for {}", id);
            }
        }
        delivered
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn channel() -> (ConnectionSender, UnboundedReceiver<Outbound>) {
        mpsc::unbounded_channel()
    }

    fn expect_frame(item: Outbound) -> serde_json::Value {
        match item {
            Outbound::Frame(text) => serde_json::from_str(&text).unwrap(),
            other => panic!("expected frame, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_reaches_connected_participant() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = channel();
        registry.connect("u1", tx);

        assert!(registry.send("u1", &json!({"content": "hi"})));
        let frame = expect_frame(rx.recv().await.unwrap());
        assert_eq!(frame["content"], "hi");
    }

    #[tokio::test]
    async fn test_send_to_absent_id_is_noop() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.send("nobody", &json!({"content": "hi"})));
    }

    #[tokio::test]
    async fn test_last_connect_wins() {
        let registry = ConnectionRegistry::new();
        let (tx1, mut rx1) = channel();
        let (tx2, mut rx2) = channel();
        registry.connect("u1", tx1);
        registry.connect("u1", tx2);

        // Old channel got a close, not the message
        match rx1.recv().await.unwrap() {
            Outbound::Close(Some(frame)) => assert_eq!(frame.code, 1000),
            other => panic!("expected close on displaced channel, got {:?}", other),
        }

        registry.send("u1", &json!({"content": "hi"}));
        let frame = expect_frame(rx2.recv().await.unwrap());
        assert_eq!(frame["content"], "hi");
        assert_eq!(registry.connection_count(), 1);
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = channel();
        registry.connect("u1", tx);

        registry.disconnect("u1");
        registry.disconnect("u1");
        registry.disconnect("never-registered");
        assert_eq!(registry.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_release_ignores_stale_serial() {
        let registry = ConnectionRegistry::new();
        let (tx1, _rx1) = channel();
        let (tx2, _rx2) = channel();
        let old_serial = registry.connect("u1", tx1);
        registry.connect("u1", tx2);

        // The displaced connection's cleanup must not evict the replacement
        registry.release("u1", old_serial);
        assert!(registry.is_connected("u1"));
    }

    #[tokio::test]
    async fn test_release_with_matching_serial_removes() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = channel();
        let serial = registry.connect("u1", tx);
        registry.release("u1", serial);
        assert!(!registry.is_connected("u1"));
    }

    #[tokio::test]
    async fn test_snapshot_is_point_in_time_copy() {
        let registry = ConnectionRegistry::new();
        let (tx1, _rx1) = channel();
        let (tx2, _rx2) = channel();
        registry.connect("u1", tx1);
        registry.connect("u2", tx2);

        let snapshot = registry.snapshot_ids();
        registry.disconnect("u1");

        // Mutations after the snapshot do not affect it
        assert!(snapshot.contains("u1"));
        assert!(snapshot.contains("u2"));
        assert_eq!(snapshot.len(), 2);
        assert!(!registry.is_connected("u1"));
    }

    #[tokio::test]
    async fn test_broadcast_isolates_closed_channels() {
        let registry = ConnectionRegistry::new();
        let (tx1, rx1) = channel();
        let (tx2, mut rx2) = channel();
        registry.connect("u1", tx1);
        registry.connect("u2", tx2);

        // u1's writer task is gone; its channel send fails
        drop(rx1);

        let delivered = registry.broadcast(&json!({"content": "to everyone"}));
        assert_eq!(delivered, 1);
        let frame = expect_frame(rx2.recv().await.unwrap());
        assert_eq!(frame["content"], "to everyone");
    }
}

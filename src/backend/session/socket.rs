/**
 * WebSocket Connection Handling
 *
 * Upgrades the chat route into a pair of per-connection tasks:
 *
 * - the reader (this task): runs the handshake, registers the connection,
 *   then feeds each inbound frame to the message router
 * - the writer: owns the socket sink and drains the outbound channel the
 *   registry delivers into
 *
 * Splitting reader and writer means a send to this connection never
 * touches the reader's control flow, and registry delivery is a plain
 * channel enqueue.
 *
 * # Cleanup
 *
 * On any exit path the reader releases its registry entry with the serial
 * it was registered under, so a connection displaced by a newer login
 * cannot evict its replacement. In-flight persistence writes submitted by
 * the router complete on their own; once the connection is gone their
 * outcome is only logged.
 */

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, Stream, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::backend::error::ChatError;
use crate::backend::registry::Outbound;
use crate::backend::server::state::AppState;
use crate::backend::session::handshake::{parse_identity_frame, SessionPhase};

/// Handle chat WebSocket upgrade (GET /api/v1/chat/ws)
pub async fn chat_ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Run one connection from accept to close
async fn handle_socket(socket: WebSocket, state: AppState) {
    let mut phase = SessionPhase::Connecting;
    let (ws_sink, mut ws_stream) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<Outbound>();
    let writer = tokio::spawn(write_loop(ws_sink, rx));

    phase = advance(phase, SessionPhase::AwaitingIdentity);
    let participant_id =
        match await_identity(&mut ws_stream, state.config.handshake_timeout).await {
            Ok(id) => id,
            Err(err) => {
                tracing::warn!("[Session] Handshake rejected: {}", err);
                let _ = tx.send(Outbound::Close(err.to_close_frame()));
                advance(phase, SessionPhase::Closed);
                let _ = writer.await;
                return;
            }
        };

    let serial = state.registry.connect(&participant_id, tx.clone());
    phase = advance(phase, SessionPhase::Active);
    tracing::info!(
        "[Session] {} active ({} connection(s) total)",
        participant_id,
        state.registry.connection_count()
    );

    while let Some(received) = ws_stream.next().await {
        let message = match received {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!("[Session] {} transport error: {}", participant_id, e);
                break;
            }
        };
        match message {
            Message::Text(text) => {
                if handle_frame(&state, &participant_id, &tx, text.as_str())
                    .await
                    .is_break()
                {
                    break;
                }
            }
            Message::Binary(_) => {
                // The protocol is JSON text; a binary frame means the peer
                // is speaking something else entirely
                let err: ChatError =
                    crate::shared::SharedError::serialization("binary frame on text protocol")
                        .into();
                let _ = tx.send(Outbound::Close(err.to_close_frame()));
                break;
            }
            Message::Close(_) => {
                tracing::debug!("[Session] {} closed by peer", participant_id);
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    state.registry.release(&participant_id, serial);
    advance(phase, SessionPhase::Closed);
    drop(tx);
    let _ = writer.await;
    tracing::info!("[Session] {} closed", participant_id);
}

/// Parse one inbound text frame and route it; decides whether the
/// connection survives the outcome
///
/// Acks and close frames go to this session's own channel, never through
/// the registry: after a last-connect-wins displacement the registry entry
/// under `participant_id` belongs to the replacement connection, while
/// this reader may still be draining buffered frames.
async fn handle_frame(
    state: &AppState,
    participant_id: &str,
    tx: &mpsc::UnboundedSender<Outbound>,
    text: &str,
) -> std::ops::ControlFlow<()> {
    let outcome = match crate::shared::ChatFrame::parse(text) {
        Ok(frame) => state.router.handle_inbound(participant_id, frame).await,
        Err(parse_err) => Err(parse_err.into()),
    };

    if let Err(err) = outcome {
        tracing::warn!("[Session] {} frame error: {}", participant_id, err);
        if let Some(ack) = err.to_ack() {
            match serde_json::to_string(&ack) {
                Ok(ack_text) => {
                    let _ = tx.send(Outbound::Frame(ack_text));
                }
                Err(e) => {
                    tracing::error!("[Session] Failed to serialize error ack: {}", e);
                }
            }
        }
        if err.is_fatal_to_connection() {
            let _ = tx.send(Outbound::Close(err.to_close_frame()));
            return std::ops::ControlFlow::Break(());
        }
    }
    std::ops::ControlFlow::Continue(())
}

/// Wait for the single identity frame, bounded by the handshake timeout
///
/// A hung handshake would otherwise park this task forever and leak the
/// transport. Generic over the frame stream so the policy can be driven
/// without a live socket.
async fn await_identity<S>(frames: &mut S, timeout: Duration) -> Result<String, ChatError>
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let result = tokio::time::timeout(timeout, async {
        loop {
            match frames.next().await {
                Some(Ok(Message::Text(text))) => return parse_identity_frame(text.as_str()),
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                Some(Ok(_)) => {
                    return Err(ChatError::handshake("expected a JSON text frame"));
                }
                Some(Err(e)) => {
                    return Err(ChatError::handshake(format!("transport error: {}", e)));
                }
                None => {
                    return Err(ChatError::handshake("connection closed before identity frame"));
                }
            }
        }
    })
    .await;

    match result {
        Ok(parsed) => parsed,
        Err(_) => Err(ChatError::handshake("timed out waiting for identity frame")),
    }
}

/// Drain the outbound channel into the socket sink until close
async fn write_loop(
    mut sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
) {
    while let Some(item) = rx.recv().await {
        match item {
            Outbound::Frame(text) => {
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            Outbound::Close(frame) => {
                let _ = sink.send(Message::Close(frame)).await;
                break;
            }
        }
    }
    // Receiver drained or socket gone either way; dropping the sink
    // completes the close handshake
}

/// Log and perform a phase transition
fn advance(from: SessionPhase, to: SessionPhase) -> SessionPhase {
    debug_assert!(from.can_transition_to(to), "illegal phase transition");
    tracing::trace!("[Session] {:?} -> {:?}", from, to);
    to
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::error::conversion::{CLOSE_POLICY_VIOLATION, CLOSE_UNSUPPORTED_DATA};
    use crate::backend::registry::ConnectionRegistry;
    use crate::backend::router::MessageRouter;
    use crate::backend::store::{MemoryHistoryGateway, MemoryIdentityDirectory};
    use crate::shared::config::ChatConfig;
    use futures_util::stream;
    use std::sync::Arc;

    fn app_state() -> AppState {
        let registry = ConnectionRegistry::new();
        let config = ChatConfig::default();
        let router = MessageRouter::new(
            registry.clone(),
            Arc::new(MemoryHistoryGateway::new()),
            Arc::new(MemoryIdentityDirectory::permissive()),
            config.clone(),
        );
        AppState::new(registry, router, config)
    }

    fn text_frame(text: &str) -> Result<Message, axum::Error> {
        Ok(Message::Text(text.to_string().into()))
    }

    #[tokio::test]
    async fn test_handshake_accepts_identity_frame() {
        let mut frames = stream::iter(vec![text_frame(r#"{"user_id": "u1"}"#)]);
        let id = await_identity(&mut frames, Duration::from_secs(1)).await.unwrap();
        assert_eq!(id, "u1");
    }

    #[tokio::test]
    async fn test_handshake_ignores_pings_before_identity() {
        let mut frames = stream::iter(vec![
            Ok(Message::Ping(Default::default())),
            text_frame(r#"{"user_id": "u2"}"#),
        ]);
        let id = await_identity(&mut frames, Duration::from_secs(1)).await.unwrap();
        assert_eq!(id, "u2");
    }

    #[tokio::test]
    async fn test_handshake_times_out_on_silent_connection() {
        let mut frames = stream::pending::<Result<Message, axum::Error>>();
        let err = await_identity(&mut frames, Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::HandshakeViolation { .. }));
        let close = err.to_close_frame().expect("timeout closes the transport");
        assert_eq!(close.code, CLOSE_POLICY_VIOLATION);
    }

    #[tokio::test]
    async fn test_handshake_rejects_stream_end_before_identity() {
        let mut frames = stream::iter(Vec::<Result<Message, axum::Error>>::new());
        let err = await_identity(&mut frames, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::HandshakeViolation { .. }));
    }

    #[tokio::test]
    async fn test_fatal_frame_closes_own_channel_not_replacement() {
        let state = app_state();
        let (old_tx, mut old_rx) = mpsc::unbounded_channel();
        state.registry.connect("u1", old_tx.clone());

        // A newer login displaces the registry entry while the old reader
        // still has buffered frames to drain
        let (new_tx, mut new_rx) = mpsc::unbounded_channel();
        state.registry.connect("u1", new_tx);
        match old_rx.recv().await.unwrap() {
            Outbound::Close(_) => {}
            other => panic!("expected displacement close, got {:?}", other),
        }

        let flow = handle_frame(&state, "u1", &old_tx, "not json").await;
        assert!(flow.is_break());

        match old_rx.recv().await.unwrap() {
            Outbound::Close(Some(frame)) => assert_eq!(frame.code, CLOSE_UNSUPPORTED_DATA),
            other => panic!("expected close on the offending channel, got {:?}", other),
        }
        assert!(new_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_validation_ack_goes_to_own_channel() {
        let state = app_state();
        let (old_tx, mut old_rx) = mpsc::unbounded_channel();
        state.registry.connect("u1", old_tx.clone());
        let (new_tx, mut new_rx) = mpsc::unbounded_channel();
        state.registry.connect("u1", new_tx);
        let _ = old_rx.recv().await;

        // Structurally valid JSON with a missing field: acked, not fatal
        let flow = handle_frame(&state, "u1", &old_tx, r#"{"recipient": "u2"}"#).await;
        assert!(flow.is_continue());

        match old_rx.recv().await.unwrap() {
            Outbound::Frame(text) => assert!(text.contains("error")),
            other => panic!("expected ack frame, got {:?}", other),
        }
        assert!(new_rx.try_recv().is_err());
    }
}

//! Session Module
//!
//! Per-connection lifecycle: the identity handshake that gates a raw
//! WebSocket into a registered, addressable session, and the receive loop
//! that feeds validated frames to the message router.
//!
//! # Lifecycle
//!
//! ```text
//! Connecting -> AwaitingIdentity -> Active -> Closed
//! ```
//!
//! - `Connecting`: transport accepted, no frames exchanged yet
//! - `AwaitingIdentity`: exactly one structured frame carrying a
//!   `user_id` is expected, within a configured timeout
//! - `Active`: registered in the connection registry; frames flow to the
//!   router; one identity binds for the lifetime of one transport
//! - `Closed`: on transport close, malformed-frame close, displacement,
//!   or handshake violation; always releases the registry entry
//!
//! # Module Structure
//!
//! ```text
//! session/
//! ├── mod.rs       - Module exports and documentation
//! ├── handshake.rs - Phase machine and identity-frame validation
//! └── socket.rs    - WebSocket upgrade handler and connection loops
//! ```

/// Handshake phase machine and identity-frame validation
pub mod handshake;

/// WebSocket upgrade handler and per-connection loops
pub mod socket;

pub use handshake::{parse_identity_frame, SessionPhase};
pub use socket::chat_ws_handler;

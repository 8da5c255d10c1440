//! AiderChat - Main Library
//!
//! AiderChat is the real-time chat subsystem of a peer-support platform.
//! It binds raw WebSocket transports to participant identities, keeps a
//! process-wide registry of live connections, and routes every inbound
//! frame to the right set of live recipients while recording it through
//! a pluggable history gateway.
//!
//! # Module Structure
//!
//! The library is organized into two main modules:
//!
//! - **`shared`** - Types shared between the wire protocol and the server
//!   - Chat/handshake frame structures and validation
//!   - Message model
//!   - Chat configuration
//!   - Shared error types
//!
//! - **`backend`** - Server-side code
//!   - Connection registry (live participant channels)
//!   - Session handshake state machine and per-connection loops
//!   - Message router (group fan-out, individual delivery, persistence)
//!   - History gateway and identity directory adapters (Postgres / memory)
//!   - Axum server assembly
//!
//! # Usage
//!
//! ```rust,no_run
//! use aiderchat::backend::server::init::create_app;
//!
//! # async fn example() {
//! let app = create_app().await;
//! // Serve with axum
//! # }
//! ```

/// Types shared between wire protocol and server
pub mod shared;

/// Server-side code
pub mod backend;

//! Backend Module
//!
//! This module contains all server-side code for the AiderChat subsystem.
//! It provides the WebSocket chat endpoint, the live-connection registry,
//! the identity handshake, and the message router with its persistence
//! side-effects.
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`registry`** - Process-wide table of live participant connections
//! - **`session`** - Handshake state machine and per-connection loops
//! - **`router`** - Recipient classification, fan-out, persistence
//! - **`store`** - History gateway and identity directory adapters
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs       - Module exports and documentation
//! ├── server/      - Server initialization and state
//! ├── routes/      - Route configuration
//! ├── registry/    - Live connection registry
//! ├── session/     - Handshake and connection lifecycle
//! ├── router/      - Message routing
//! ├── store/       - Persistence adapters
//! └── error/       - Error types
//! ```
//!
//! # Concurrency
//!
//! Each accepted connection is handled by its own tokio task, plus one
//! writer task that owns the socket sink. The only state shared across
//! connection tasks is the registry table, which serializes its mutations
//! behind a mutex that is never held across an await. Delivery to a
//! channel is an unbounded enqueue, so one slow recipient cannot stall
//! registry mutations for unrelated connections.
//!
//! # Error Handling
//!
//! Per-connection errors are isolated: they terminate or degrade only the
//! offending connection, never the registry or other connections. There is
//! no process-wide fatal error path in this subsystem.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Live connection registry
pub mod registry;

/// Handshake and per-connection lifecycle
pub mod session;

/// Message routing
pub mod router;

/// History gateway and identity directory adapters
pub mod store;

/// Backend error types
pub mod error;

/// Re-export commonly used types
pub use error::ChatError;
pub use registry::ConnectionRegistry;
pub use server::state::AppState;

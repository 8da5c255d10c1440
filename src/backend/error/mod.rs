//! Backend Error Module
//!
//! This module defines the error taxonomy for the chat subsystem.
//! These errors are produced by handshake validation, frame validation,
//! and the message router, and can be converted into wire artifacts
//! (error acknowledgments and WebSocket close frames).
//!
//! # Architecture
//!
//! The error module is organized into focused submodules:
//!
//! - **`types`** - Error type definitions and constructors
//! - **`conversion`** - Conversion into error acks and close frames
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - Wire conversions
//! ```
//!
//! # Error Taxonomy
//!
//! - `HandshakeViolation` - malformed or missing identity frame; the
//!   transport is closed immediately and never registered
//! - `MalformedFrame` - un-parseable or invalid chat frame; depending on
//!   severity the frame is answered with an ack or the connection closed
//! - `UnknownRecipient` - recipient matches neither a known individual nor
//!   a configured group; nothing is persisted
//! - `Persistence` - a history gateway operation failed; live delivery is
//!   never rolled back
//!
//! A recipient that is merely offline is not an error: individual delivery
//! misses are acknowledged to the sender and the message is still persisted.
//!
//! # Propagation Policy
//!
//! Per-connection errors are isolated. They terminate or degrade only the
//! offending connection, never the registry or other connections.

/// Error type definitions
pub mod types;

/// Wire conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::ChatError;

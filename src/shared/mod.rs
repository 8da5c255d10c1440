//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the wire protocol and the server. These types are used for serialization
//! and communication over the chat WebSocket.
//!
//! # Overview
//!
//! The shared module provides the frame shapes a client exchanges with the
//! server, the durable message model, chat configuration, and common error
//! types. All types are designed for serialization and transmission as JSON.

/// Wire frames (handshake, chat, error acknowledgment)
pub mod frame;

/// Durable message model
pub mod message;

/// Shared error types
pub mod error;

/// Chat configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use frame::{ChatFrame, ErrorAck, HandshakeFrame, OutboundFrame};
pub use message::{Message, NewMessage};
pub use error::SharedError;
pub use config::{ChatConfig, ChatConfigBuilder, ConfigError};

//! Connection Registry
//!
//! Process-wide table mapping a participant id to exactly one live
//! bidirectional channel. No persistence, no business logic.
//!
//! # Ownership
//!
//! The registry does not hold sockets. Each connection has a writer task
//! that owns the WebSocket sink and drains an unbounded channel of
//! [`Outbound`] items; the registry holds only the sending half. Closing a
//! registry entry enqueues [`Outbound::Close`], which makes the writer task
//! close the socket and terminate.
//!
//! # Concurrency
//!
//! The internal table is the only state shared across connection tasks.
//! `connect`, `disconnect`, and `snapshot_ids` serialize on a standard
//! mutex that is never held across an await. `send` holds the lock only to
//! clone the channel handle; the enqueue and the socket I/O happen outside
//! it, so one slow recipient cannot stall registry mutations for unrelated
//! connections.
//!
//! # Last-Connect-Wins
//!
//! Registering an id that already has a live entry closes and replaces the
//! previous channel. This prevents leaked duplicate sessions. Replacement
//! is not an error. Each registration is stamped with a serial so the
//! displaced connection's cleanup cannot evict its replacement.

pub mod table;

pub use table::{ConnectionRegistry, ConnectionSender, Outbound};

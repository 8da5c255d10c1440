//! Persistence Adapters
//!
//! This module defines the storage operations the message router consumes,
//! behind traits, plus the two implementations: a PostgreSQL adapter used
//! in production and an in-memory adapter used as the degraded-mode
//! fallback (no `DATABASE_URL`) and as the test double.
//!
//! # Traits
//!
//! - **`HistoryGateway`** - append-only message store: insert, find all
//!   messages addressed to an id, and the chat-log roster appends kept on
//!   profile documents
//! - **`IdentityDirectory`** - "does this recipient id exist at all"
//!   lookup against the external identity store (users and councilors)
//!
//! # Failure Semantics
//!
//! Gateway failures are reported to the router as local errors, never as
//! transport-level failures. The router favors "deliver now, warn about
//! durability" over blocking real-time chat on storage latency.

pub mod gateway;
pub mod memory;
pub mod pg;

pub use gateway::{HistoryGateway, IdentityDirectory, StoreError};
pub use memory::{MemoryHistoryGateway, MemoryIdentityDirectory};
pub use pg::{PgHistoryGateway, PgIdentityDirectory};

//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs    - Module exports and documentation
//! └── router.rs - Main router creation
//! ```

/// Main router creation and route assembly
pub mod router;

// Re-export the main router creation function
pub use router::create_router;

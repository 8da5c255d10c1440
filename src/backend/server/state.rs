/**
 * Application State Management
 *
 * This module defines the application state structure shared by the chat
 * WebSocket handler.
 *
 * # Thread Safety
 *
 * Everything here is cheaply clonable and safe to share across handler
 * tasks: the registry clones share one synchronized table, the router
 * clones share the same storage adapters behind `Arc`, and the config is
 * immutable after startup.
 */

use crate::backend::registry::ConnectionRegistry;
use crate::backend::router::MessageRouter;
use crate::shared::config::ChatConfig;

/// Application state for the chat server
///
/// # Fields
///
/// * `registry` - process-wide table of live participant connections
/// * `router` - message router (owns the storage adapters)
/// * `config` - chat configuration (groups, echo policy, handshake timeout)
#[derive(Clone)]
pub struct AppState {
    /// Live connection registry
    pub registry: ConnectionRegistry,
    /// Message router
    pub router: MessageRouter,
    /// Chat configuration
    pub config: ChatConfig,
}

impl AppState {
    pub fn new(registry: ConnectionRegistry, router: MessageRouter, config: ChatConfig) -> Self {
        Self {
            registry,
            router,
            config,
        }
    }
}

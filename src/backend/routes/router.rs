/**
 * Router Configuration
 * 
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 * 
 * # Route Details
 * 
 * - `GET /api/v1/chat/ws` - WebSocket upgrade for the chat endpoint.
 *   The first frame after upgrade must be the identity handshake.
 * - `GET /health` - liveness probe
 */

use axum::routing::get;
use axum::Router;

use crate::backend::server::state::AppState;
use crate::backend::session::socket::chat_ws_handler;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Application state containing the registry and router
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub fn create_router(app_state: AppState) -> Router<()> {
    Router::new()
        .route("/api/v1/chat/ws", get(chat_ws_handler))
        .route("/health", get(health))
        .fallback(|| async { "404 Not Found" })
        .with_state(app_state)
}

/// Liveness probe
async fn health() -> &'static str {
    "OK"
}

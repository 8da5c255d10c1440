/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP
 * server, including state creation, database loading, and route
 * configuration.
 *
 * # Initialization Process
 *
 * 1. Load chat configuration from the environment
 * 2. Load the optional database pool
 * 3. Select storage adapters (Postgres, or in-memory fallback)
 * 4. Create the connection registry and message router
 * 5. Create and configure the router
 *
 * # Degraded Mode
 *
 * A missing or unreachable database does not prevent startup: the server
 * falls back to in-memory storage with a permissive identity directory.
 * Chat still works; history does not survive a restart.
 */

use std::sync::Arc;

use axum::Router;

use crate::backend::registry::ConnectionRegistry;
use crate::backend::router::MessageRouter;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_chat_config, load_database};
use crate::backend::server::state::AppState;
use crate::backend::store::{
    HistoryGateway, IdentityDirectory, MemoryHistoryGateway, MemoryIdentityDirectory,
    PgHistoryGateway, PgIdentityDirectory,
};

/// Create and configure the Axum application
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub async fn create_app() -> Router<()> {
    tracing::info!("Initializing AiderChat backend server");

    // Step 1: Chat configuration
    let config = load_chat_config();

    // Step 2: Optional database
    let db_pool = load_database().await;

    // Step 3: Storage adapters
    let (history, directory): (Arc<dyn HistoryGateway>, Arc<dyn IdentityDirectory>) =
        match db_pool {
            Some(pool) => (
                Arc::new(PgHistoryGateway::new(pool.clone())),
                Arc::new(PgIdentityDirectory::new(pool)),
            ),
            None => {
                tracing::warn!("Running with in-memory chat history");
                (
                    Arc::new(MemoryHistoryGateway::new()),
                    Arc::new(MemoryIdentityDirectory::permissive()),
                )
            }
        };

    // Step 4: Registry and router
    let registry = ConnectionRegistry::new();
    let router = MessageRouter::new(registry.clone(), history, directory, config.clone());
    let app_state = AppState::new(registry, router, config);

    tracing::info!("Connection registry and message router initialized");

    // Step 5: Routes
    create_router(app_state)
}

/**
 * Server Configuration
 *
 * This module handles loading of server configuration from environment
 * variables: the chat configuration (groups, echo policy, handshake
 * timeout) and the optional PostgreSQL database connection.
 *
 * # Configuration Sources
 *
 * Configuration is loaded from environment variables, with sensible
 * defaults for local development:
 *
 * - `CHAT_GROUPS` - comma-separated well-known group ids
 *   (default `explicit-quitters,grass-quitters`)
 * - `CHAT_ECHO_TO_SENDER` - whether group fan-out echoes back to the
 *   sender (default `true`)
 * - `HANDSHAKE_TIMEOUT_SECS` - identity-frame deadline (default 30)
 * - `DATABASE_URL` - PostgreSQL connection string (optional)
 *
 * # Error Handling
 *
 * Configuration errors are logged but do not prevent server startup.
 * Invalid values fall back to defaults; a missing or unreachable database
 * drops the server into in-memory mode.
 */

use std::time::Duration;

use sqlx::PgPool;

use crate::shared::config::ChatConfig;

/// Database configuration result
///
/// Contains the database connection pool if successfully configured,
/// or `None` if the database is not available.
pub type DatabaseConfig = Option<PgPool>;

/// Load chat configuration from the environment
///
/// Never fails: unparseable values are logged and replaced by defaults.
pub fn load_chat_config() -> ChatConfig {
    let mut builder = ChatConfig::builder();

    if let Ok(raw) = std::env::var("CHAT_GROUPS") {
        let groups: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if groups.is_empty() {
            tracing::warn!("CHAT_GROUPS is set but empty, using default groups");
        } else {
            builder = builder.groups(groups);
        }
    }

    if let Ok(raw) = std::env::var("CHAT_ECHO_TO_SENDER") {
        match raw.parse::<bool>() {
            Ok(echo) => builder = builder.echo_to_sender(echo),
            Err(_) => {
                tracing::warn!("CHAT_ECHO_TO_SENDER={} is not a boolean, using default", raw)
            }
        }
    }

    if let Ok(raw) = std::env::var("HANDSHAKE_TIMEOUT_SECS") {
        match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => {
                builder = builder.handshake_timeout(Duration::from_secs(secs))
            }
            _ => tracing::warn!(
                "HANDSHAKE_TIMEOUT_SECS={} is not a positive integer, using default",
                raw
            ),
        }
    }

    match builder.build() {
        Ok(config) => {
            tracing::info!(
                "Chat config: groups={:?}, echo_to_sender={}, handshake_timeout={:?}",
                config.groups,
                config.echo_to_sender,
                config.handshake_timeout
            );
            config
        }
        Err(e) => {
            tracing::error!("Invalid chat configuration ({}), using defaults", e);
            ChatConfig::default()
        }
    }
}

/// Load and initialize the database connection pool
///
/// # Returns
///
/// - `Some(PgPool)` if the database is successfully configured
/// - `None` if `DATABASE_URL` is not set or the connection fails
///
/// Errors are logged but do not prevent server startup. The server runs
/// with in-memory storage (messages lost on restart) when this returns
/// `None`.
pub async fn load_database() -> DatabaseConfig {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!("DATABASE_URL not set. Chat history will be kept in memory only.");
            return None;
        }
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Chat history will be kept in memory only.");
            return None;
        }
    };

    tracing::info!("Database connection pool created successfully");
    Some(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-dependent parsing is exercised indirectly; here we only pin the
    // defaults the loaders fall back to.
    #[test]
    fn test_default_chat_config_shape() {
        let config = ChatConfig::default();
        assert_eq!(config.groups.len(), 2);
        assert!(config.echo_to_sender);
        assert_eq!(config.handshake_timeout, Duration::from_secs(30));
    }
}

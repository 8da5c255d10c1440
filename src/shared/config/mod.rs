//! Chat configuration module
//!
//! Provides configuration types for the chat subsystem: the well-known
//! group ids, the group fan-out echo policy, and the handshake timeout.

use std::collections::HashSet;
use std::time::Duration;

use thiserror::Error;

/// Default well-known peer-support groups
pub const DEFAULT_GROUPS: [&str; 2] = ["explicit-quitters", "grass-quitters"];

/// Default bound on time spent waiting for the identity frame
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// Chat subsystem configuration
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Fixed set of well-known group ids; not user-creatable at this layer
    pub groups: HashSet<String>,
    /// Whether group fan-out echoes the message back to its own sender.
    /// The sender is by definition a historical participant of the group
    /// once they have sent to it, so this is a deliberate policy choice,
    /// not something inferred from the delivery-set math.
    pub echo_to_sender: bool,
    /// Maximum time a connection may sit in the awaiting-identity state
    pub handshake_timeout: Duration,
}

impl ChatConfig {
    /// Create a new ChatConfigBuilder
    pub fn builder() -> ChatConfigBuilder {
        ChatConfigBuilder::default()
    }

    /// Whether `recipient` names a well-known group
    pub fn is_group(&self, recipient: &str) -> bool {
        self.groups.contains(recipient)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            groups: DEFAULT_GROUPS.iter().map(|s| s.to_string()).collect(),
            echo_to_sender: true,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }
}

/// Builder for ChatConfig
#[derive(Debug, Default)]
pub struct ChatConfigBuilder {
    groups: Option<HashSet<String>>,
    echo_to_sender: Option<bool>,
    handshake_timeout: Option<Duration>,
}

impl ChatConfigBuilder {
    /// Set the well-known group ids
    pub fn groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = Some(groups.into_iter().map(Into::into).collect());
        self
    }

    /// Set the group fan-out echo policy
    pub fn echo_to_sender(mut self, echo: bool) -> Self {
        self.echo_to_sender = Some(echo);
        self
    }

    /// Set the handshake timeout
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = Some(timeout);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ChatConfig, ConfigError> {
        let defaults = ChatConfig::default();
        let groups = self.groups.unwrap_or(defaults.groups);
        if groups.iter().any(|g| g.is_empty()) {
            return Err(ConfigError::InvalidValue("group id must not be empty"));
        }
        let handshake_timeout = self.handshake_timeout.unwrap_or(defaults.handshake_timeout);
        if handshake_timeout.is_zero() {
            return Err(ConfigError::InvalidValue("handshake timeout must be non-zero"));
        }
        Ok(ChatConfig {
            groups,
            echo_to_sender: self.echo_to_sender.unwrap_or(defaults.echo_to_sender),
            handshake_timeout,
        })
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value: {0}")]
    InvalidValue(&'static str),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_groups() {
        let config = ChatConfig::default();
        assert!(config.is_group("explicit-quitters"));
        assert!(config.is_group("grass-quitters"));
        assert!(!config.is_group("u1"));
    }

    #[test]
    fn test_default_policy_and_timeout() {
        let config = ChatConfig::default();
        assert!(config.echo_to_sender);
        assert_eq!(config.handshake_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builder_overrides() {
        let config = ChatConfig::builder()
            .groups(["night-owls"])
            .echo_to_sender(false)
            .handshake_timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert!(config.is_group("night-owls"));
        assert!(!config.is_group("explicit-quitters"));
        assert!(!config.echo_to_sender);
    }

    #[test]
    fn test_empty_group_id_rejected() {
        let result = ChatConfig::builder().groups([""]).build();
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = ChatConfig::builder()
            .handshake_timeout(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }
}

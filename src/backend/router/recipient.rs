//! Recipient classification
//!
//! A recipient id names either an individual participant or one of the
//! configured well-known groups. The distinction is resolved exactly once
//! at the top of message handling and carried as a tagged variant from
//! then on, never re-inspected ad hoc.

use crate::shared::config::ChatConfig;

/// The resolved target of an inbound chat frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// An individual participant id
    Individual(String),
    /// A well-known group id from the configured set
    Group(String),
}

impl Recipient {
    /// Classify a raw recipient id against the configured group set
    pub fn classify(recipient: &str, config: &ChatConfig) -> Self {
        if config.is_group(recipient) {
            Self::Group(recipient.to_string())
        } else {
            Self::Individual(recipient.to_string())
        }
    }

    /// The underlying id, whichever kind it is
    pub fn id(&self) -> &str {
        match self {
            Self::Individual(id) | Self::Group(id) => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_group_classifies_as_group() {
        let config = ChatConfig::default();
        let recipient = Recipient::classify("explicit-quitters", &config);
        assert_eq!(recipient, Recipient::Group("explicit-quitters".to_string()));
    }

    #[test]
    fn test_anything_else_classifies_as_individual() {
        let config = ChatConfig::default();
        let recipient = Recipient::classify("u1", &config);
        assert_eq!(recipient, Recipient::Individual("u1".to_string()));
    }

    #[test]
    fn test_groups_are_not_user_creatable() {
        // A group-looking name outside the configured set is an individual
        let config = ChatConfig::default();
        let recipient = Recipient::classify("my-new-group", &config);
        assert!(matches!(recipient, Recipient::Individual(_)));
    }

    #[test]
    fn test_id_accessor() {
        let config = ChatConfig::default();
        assert_eq!(Recipient::classify("u1", &config).id(), "u1");
        assert_eq!(
            Recipient::classify("grass-quitters", &config).id(),
            "grass-quitters"
        );
    }
}

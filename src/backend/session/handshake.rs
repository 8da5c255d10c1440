//! Identity handshake
//!
//! The first frame on every connection must bind a participant identity.
//! Validation is a pure function from raw text to a `Result`; the socket
//! loop decides what a failure does to the transport.

use crate::backend::error::ChatError;
use crate::shared::frame::HandshakeFrame;

/// The phases a connection moves through, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Transport accepted, no frames exchanged yet
    Connecting,
    /// Waiting for the single identity frame
    AwaitingIdentity,
    /// Registered and addressable; frames flow to the router
    Active,
    /// Terminal; the registry entry (if any) has been released
    Closed,
}

impl SessionPhase {
    /// Whether moving to `next` is a legal phase transition
    ///
    /// Phases only move forward; any phase may close, and there is no
    /// re-handshake out of `Active`.
    pub fn can_transition_to(self, next: SessionPhase) -> bool {
        matches!(
            (self, next),
            (SessionPhase::Connecting, SessionPhase::AwaitingIdentity)
                | (SessionPhase::AwaitingIdentity, SessionPhase::Active)
                | (SessionPhase::Connecting, SessionPhase::Closed)
                | (SessionPhase::AwaitingIdentity, SessionPhase::Closed)
                | (SessionPhase::Active, SessionPhase::Closed)
        )
    }
}

/// Validate the identity frame and extract the participant id
///
/// Any shape other than `{"user_id": "<non-empty string>"}` is a protocol
/// violation: the caller closes the transport with a policy-violation
/// signal and never registers the connection.
pub fn parse_identity_frame(text: &str) -> Result<String, ChatError> {
    HandshakeFrame::parse(text)
        .map(|frame| frame.user_id)
        .map_err(|e| ChatError::handshake(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_valid_identity_frame() {
        let id = parse_identity_frame(r#"{"user_id": "u1"}"#).unwrap();
        assert_eq!(id, "u1");
    }

    #[test]
    fn test_missing_user_id_is_violation() {
        let err = parse_identity_frame(r#"{"name": "u1"}"#).unwrap_err();
        assert_matches!(err, ChatError::HandshakeViolation { .. });
    }

    #[test]
    fn test_non_string_user_id_is_violation() {
        let err = parse_identity_frame(r#"{"user_id": 7}"#).unwrap_err();
        assert_matches!(err, ChatError::HandshakeViolation { .. });
    }

    #[test]
    fn test_garbage_is_violation() {
        let err = parse_identity_frame("definitely not json").unwrap_err();
        assert_matches!(err, ChatError::HandshakeViolation { .. });
    }

    #[test]
    fn test_phase_ordering() {
        use SessionPhase::*;
        assert!(Connecting.can_transition_to(AwaitingIdentity));
        assert!(AwaitingIdentity.can_transition_to(Active));
        assert!(Active.can_transition_to(Closed));
        assert!(AwaitingIdentity.can_transition_to(Closed));

        // No re-handshake, no going backwards
        assert!(!Active.can_transition_to(AwaitingIdentity));
        assert!(!Closed.can_transition_to(Active));
        assert!(!Connecting.can_transition_to(Active));
    }
}

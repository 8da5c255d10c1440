/**
 * Error Conversion
 *
 * This module converts chat errors into the two wire artifacts the
 * subsystem produces: error acknowledgment frames sent back to the
 * offending sender, and WebSocket close frames for errors that end
 * the connection.
 *
 * # Ack Format
 *
 * Error acknowledgments are JSON objects:
 * ```json
 * {
 *   "status": "error",
 *   "message": "Recipient u404 not found"
 * }
 * ```
 */

use axum::extract::ws::CloseFrame;

use crate::backend::error::types::ChatError;
use crate::shared::frame::ErrorAck;

/// WebSocket close code: policy violation (handshake rejected)
pub const CLOSE_POLICY_VIOLATION: u16 = 1008;

/// WebSocket close code: unsupported data (peer not speaking JSON)
pub const CLOSE_UNSUPPORTED_DATA: u16 = 1003;

impl ChatError {
    /// The acknowledgment frame for this error, if the sender should get one
    ///
    /// Handshake violations produce no ack: the connection was never
    /// registered, so there is nobody addressable to acknowledge.
    pub fn to_ack(&self) -> Option<ErrorAck> {
        match self {
            Self::HandshakeViolation { .. } => None,
            Self::MalformedFrame { source } => Some(ErrorAck::new(format!(
                "Invalid message frame: {}",
                source
            ))),
            Self::UnknownRecipient { id } => {
                Some(ErrorAck::new(format!("Recipient {} not found", id)))
            }
            // Neutral wording: the same variant covers a failed insert after
            // delivery and a failed history read before anything was sent
            Self::Persistence { .. } => {
                Some(ErrorAck::new("Message could not be saved".to_string()))
            }
        }
    }

    /// The close frame for this error, if it ends the connection
    pub fn to_close_frame(&self) -> Option<CloseFrame> {
        if !self.is_fatal_to_connection() {
            return None;
        }
        let code = match self {
            Self::HandshakeViolation { .. } => CLOSE_POLICY_VIOLATION,
            _ => CLOSE_UNSUPPORTED_DATA,
        };
        Some(CloseFrame {
            code,
            reason: self.to_string().into(),
        })
    }
}

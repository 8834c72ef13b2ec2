/**
 * Chat Message Data Structure
 *
 * Messages travel as JSON text frames over the `/ws` chat socket and as the
 * `data` payload of SSE `update` events. All three fields are required and
 * must not be blank.
 *
 * Addressing:
 * - `to == "ALL"` fans the message out to every connected session
 * - any other `to` is treated as a session id
 * - `to == "SYSTEM"` with content `pong` is a heartbeat reply
 */
use serde::{Deserialize, Serialize};

use crate::shared::error::{require_not_blank, SharedError};

/// Sender name used by the server itself
pub const SYSTEM: &str = "SYSTEM";
/// Broadcast address
pub const ALL: &str = "ALL";
/// Heartbeat ping content
pub const PING: &str = "ping";
/// Heartbeat reply content
pub const PONG: &str = "pong";
/// Greeting sent first on every new chat connection
pub const HANDSHAKE: &str = "HANDSHAKE";

/// Chat message exchanged between sessions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Sender identifier
    pub from: String,
    /// Recipient session id, or `ALL`
    pub to: String,
    /// Message body
    pub content: String,
}

impl Message {
    /// Create a new message
    pub fn new(from: impl Into<String>, to: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            content: content.into(),
        }
    }

    /// Create a message sent by the server
    pub fn system(to: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(SYSTEM, to, content)
    }

    /// Heartbeat ping addressed to one session
    pub fn ping(session_id: impl Into<String>) -> Self {
        Self::system(session_id, PING)
    }

    /// Parse and validate an inbound frame
    pub fn parse(text: &str) -> Result<Self, SharedError> {
        let message: Message = serde_json::from_str(text)?;
        message.validate()?;
        Ok(message)
    }

    /// Check that no field is blank
    pub fn validate(&self) -> Result<(), SharedError> {
        require_not_blank("from", &self.from)?;
        require_not_blank("to", &self.to)?;
        require_not_blank("content", &self.content)?;
        Ok(())
    }

    /// Whether this message is addressed to every session
    pub fn is_broadcast(&self) -> bool {
        self.to == ALL
    }

    /// Whether this is a heartbeat reply to the server
    pub fn is_pong(&self) -> bool {
        self.to == SYSTEM && self.content == PONG
    }
}

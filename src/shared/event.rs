/**
 * Application Event Envelope
 *
 * Side effects of writes are described by an `AppEvent`. On the wire the
 * envelope is `{content, traceId, spanId}`; inside the server it is turned
 * into a system chat message and fanned out to chat sessions and SSE
 * subscribers.
 */
use serde::{Deserialize, Serialize};

use crate::shared::message::{Message, ALL};

/// Prefix of the event published after a user is created
pub const USER_CREATED: &str = "USER_CREATED";

/// Event raised by a service after a successful write
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppEvent {
    /// Human-readable event description, e.g. `USER_CREATED: <id>`
    #[serde(rename = "content")]
    pub source: String,
    /// Trace correlation id, when one is known
    #[serde(rename = "traceId", default)]
    pub trace_id: Option<String>,
    /// Span correlation id, when one is known
    #[serde(rename = "spanId", default)]
    pub span_id: Option<String>,
}

impl AppEvent {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            trace_id: None,
            span_id: None,
        }
    }

    /// Event announcing a newly created user
    pub fn user_created(id: impl std::fmt::Display) -> Self {
        Self::new(format!("{}: {}", USER_CREATED, id))
    }

    /// Attach trace and span ids
    pub fn with_trace(mut self, trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self.span_id = Some(span_id.into());
        self
    }

    /// System broadcast carrying this event
    pub fn to_message(&self) -> Message {
        Message::system(ALL, self.source.clone())
    }
}

/**
 * Application Event Publisher
 *
 * Services publish `AppEvent`s after successful writes. Each event becomes a
 * `SYSTEM -> ALL` message that is queued for every chat session and pushed
 * to every `/update/user` subscriber. Publishing never blocks and never
 * fails the write that triggered it.
 *
 * Events are also handed to every registered `EventSink` (the Kafka producer
 * when that transport is enabled). Events that arrive *from* a transport are
 * delivered locally only, so they are not echoed back.
 */

use std::sync::Arc;

use tracing_subscriber::registry::{LookupSpan, Registry};

use crate::backend::chat::SessionRegistry;
use crate::backend::realtime::broadcast::UserUpdateEmitter;
use crate::shared::AppEvent;

/// Outbound transport for published events
pub trait EventSink: Send + Sync + std::fmt::Debug {
    /// Hand the event off; must not block the caller
    fn forward(&self, event: &AppEvent);
}

#[derive(Clone, Debug)]
pub struct EventPublisher {
    registry: SessionRegistry,
    emitter: UserUpdateEmitter,
    sinks: Vec<Arc<dyn EventSink>>,
}

impl EventPublisher {
    pub fn new(registry: SessionRegistry, emitter: UserUpdateEmitter) -> Self {
        Self {
            registry,
            emitter,
            sinks: Vec::new(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Deliver locally, then forward to every sink
    pub fn publish(&self, event: AppEvent) {
        self.deliver(&event);
        for sink in &self.sinks {
            sink.forward(&event);
        }
    }

    /// Fan out to chat sessions and SSE subscribers only
    pub fn deliver(&self, event: &AppEvent) {
        tracing::info!(
            trace_id = event.trace_id.as_deref().unwrap_or(""),
            span_id = event.span_id.as_deref().unwrap_or(""),
            "Received app event: {}",
            event.source
        );

        let message = event.to_message();
        let sessions = self.registry.broadcast(message.clone());
        let streamed = self.emitter.broadcast(&message);
        tracing::debug!(
            "App event delivered to {} chat session(s), sse subscribers: {}",
            sessions,
            streamed
        );
    }
}

/// Trace and span ids of the current span, as 16-digit hex
///
/// The trace id is the id of the outermost span (the request span under the
/// HTTP trace layer). `None` outside any span or without a registry-backed
/// subscriber.
pub fn current_trace() -> Option<(String, String)> {
    let span_id = tracing::Span::current().id()?;
    tracing::dispatcher::get_default(|dispatch| {
        let registry = dispatch.downcast_ref::<Registry>()?;
        let span = registry.span(&span_id)?;
        let root = span.scope().from_root().next()?;
        Some((
            format!("{:016x}", root.id().into_u64()),
            format!("{:016x}", span_id.into_u64()),
        ))
    })
}

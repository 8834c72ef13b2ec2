/**
 * Kafka Record Handling
 *
 * Payloads are JSON. A sample record is an `AppEvent` envelope
 * (`{content, traceId, spanId}`); it is delivered to local chat sessions and
 * SSE subscribers but not re-published, so events do not loop between
 * servers sharing the topics. A Keycloak record is decoded and logged.
 *
 * Malformed records are reported to the caller, which logs and skips them.
 */

use crate::backend::kafka::keycloak::KeycloakUserEvent;
use crate::backend::realtime::EventPublisher;
use crate::shared::{AppEvent, SharedError};

/// Deliver one rx-topic record locally
pub fn handle_sample_record(
    publisher: &EventPublisher,
    payload: &[u8],
) -> Result<AppEvent, SharedError> {
    let event: AppEvent = serde_json::from_slice(payload)?;

    let span = tracing::info_span!(
        "kafka-consumer",
        trace_id = event.trace_id.as_deref().unwrap_or(""),
        parent_span_id = event.span_id.as_deref().unwrap_or(""),
    );
    let _entered = span.enter();
    tracing::info!("[kafka] rx sample: {:?}", event);
    publisher.deliver(&event);
    Ok(event)
}

/// Decode and log one identity provider event
pub fn handle_keycloak_record(payload: &[u8]) -> Result<KeycloakUserEvent, SharedError> {
    let event: KeycloakUserEvent = serde_json::from_slice(payload)?;
    tracing::info!(
        user_id = %event.user_id,
        realm = %event.realm_id,
        "[kafka] rx keycloak: {} {:?}",
        event.event_type,
        event
    );
    Ok(event)
}

/// tx-topic payload for `event`
pub fn encode_event(event: &AppEvent) -> Result<Vec<u8>, SharedError> {
    Ok(serde_json::to_vec(event)?)
}

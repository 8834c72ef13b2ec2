//! Kafka record handling integration tests
//!
//! Records are handed to the same entry points the consumers use, against a
//! full application state. No broker is needed.

#![cfg(feature = "ssr")]

mod common;

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use serde_json::json;

use userhub::backend::kafka::{handle_keycloak_record, handle_sample_record, KeycloakEventType};
use userhub::backend::realtime::EventSink;
use userhub::backend::routes::create_router;
use userhub::shared::message::{ALL, SYSTEM};
use userhub::shared::AppEvent;

use common::*;

#[derive(Debug, Default)]
struct Outbox(Mutex<Vec<AppEvent>>);

impl EventSink for Outbox {
    fn forward(&self, event: &AppEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

#[tokio::test]
async fn test_sample_record_is_broadcast_to_chat_and_sse() {
    let state = test_state();
    let mut chat = state.registry.register_session("listener").unwrap();
    let mut sse = state.emitter.subscribe();

    let payload = json!({ "content": "hello from kafka", "traceId": "4bf92f3577b34da6", "spanId": "00f067aa0ba902b7" });
    let event = handle_sample_record(&state.events, payload.to_string().as_bytes()).unwrap();
    assert_eq!(event.trace_id.as_deref(), Some("4bf92f3577b34da6"));

    let message = chat.recv().await.unwrap();
    assert_eq!(message.from, SYSTEM);
    assert_eq!(message.to, ALL);
    assert_eq!(message.content, "hello from kafka");
    assert_eq!(sse.recv().await.unwrap(), message);
}

#[tokio::test]
async fn test_consumed_records_are_not_republished() {
    let outbox = Arc::new(Outbox::default());
    let mut state = test_state();
    state.events = state.events.clone().with_sink(outbox.clone());

    handle_sample_record(&state.events, br#"{"content":"from elsewhere"}"#).unwrap();
    assert!(outbox.0.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_user_created_is_published_as_an_envelope() {
    let outbox = Arc::new(Outbox::default());
    let mut state = test_state();
    state.events = state.events.clone().with_sink(outbox.clone());
    state.users = userhub::backend::users::UserService::new(
        userhub::backend::store::Store::memory().users,
        state.permissions.clone(),
        state.events.clone(),
    );
    let app = create_router(state);

    let created = create_user(&app, "kafka@example.com", json!([])).await;

    let events = outbox.0.lock().unwrap().clone();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].source,
        format!("USER_CREATED: {}", created["_id"].as_str().unwrap())
    );
    let wire = serde_json::to_value(&events[0]).unwrap();
    assert!(wire.get("content").is_some());
    assert!(wire.get("traceId").is_some());
    assert!(wire.get("spanId").is_some());
}

#[tokio::test]
async fn test_malformed_sample_record_changes_nothing() {
    let state = test_state();
    let mut sse = state.emitter.subscribe();

    assert!(handle_sample_record(&state.events, b"\x00\x01").is_err());
    assert!(handle_sample_record(&state.events, br#"{"traceId":"t"}"#).is_err());
    assert!(sse.try_recv().is_err());
}

#[test]
fn test_keycloak_register_event() {
    let payload = json!({
        "id": "evt-7",
        "time": 1_718_000_000_000_i64,
        "type": "REGISTER",
        "realmId": "userhub",
        "clientId": "web",
        "userId": "2f8e",
        "sessionId": "s-1",
        "ipAddress": "192.168.0.10",
        "error": null,
        "details": { "email": "new@example.com", "username": "new" }
    });
    let event = handle_keycloak_record(payload.to_string().as_bytes()).unwrap();

    assert_eq!(event.event_type, KeycloakEventType::Register);
    assert_eq!(event.user_id, "2f8e");
    assert_eq!(event.details.get("email").map(String::as_str), Some("new@example.com"));
}

#[test]
fn test_keycloak_unknown_type_is_rejected() {
    let payload = json!({
        "id": "evt-8", "time": 1, "type": "CODE_TO_TOKEN", "realmId": "r",
        "userId": "u", "ipAddress": "::1", "details": {}
    });
    assert!(handle_keycloak_record(payload.to_string().as_bytes()).is_err());
}

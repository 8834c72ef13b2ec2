//! Kafka Event Transport
//!
//! Three streams connect the server to Kafka:
//!
//! - **rx topic** - `AppEvent` envelopes from other services, delivered to
//!   local chat sessions and SSE subscribers
//! - **keycloak topic** - user events from the identity provider, logged
//! - **tx topic** - every event this server publishes, as an `AppEvent`
//!
//! Decoding and handling of records lives in `records` and is always
//! compiled. The broker connection in `transport` needs the `kafka` feature
//! (and librdkafka); without it, or without `KAFKA_BROKERS`, events stay
//! local.

/// Identity provider event payloads
pub mod keycloak;

/// Record decoding and dispatch
pub mod records;

/// rdkafka consumers and producer
#[cfg(feature = "kafka")]
pub mod transport;

pub use keycloak::{KeycloakEventType, KeycloakUserEvent};
pub use records::{encode_event, handle_keycloak_record, handle_sample_record};
#[cfg(feature = "kafka")]
pub use transport::{attach_producer, spawn_consumers, KafkaEventSink};

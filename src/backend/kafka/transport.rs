/**
 * Kafka Transport
 *
 * `KafkaEventSink` forwards published events to the tx topic from a
 * spawned task, so a slow broker never holds up the request that raised
 * the event. The consumers run for the lifetime of the process, auto-commit
 * offsets and skip records they cannot decode.
 */

use std::sync::Arc;
use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::Message as _;
use tokio::task::JoinHandle;

use crate::backend::kafka::records::{encode_event, handle_keycloak_record, handle_sample_record};
use crate::backend::realtime::{EventPublisher, EventSink};
use crate::shared::config::KafkaSettings;
use crate::shared::{AppEvent, ConfigError};

const SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct KafkaEventSink {
    producer: FutureProducer,
    topic: String,
}

impl std::fmt::Debug for KafkaEventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaEventSink")
            .field("topic", &self.topic)
            .finish()
    }
}

impl KafkaEventSink {
    pub fn new(brokers: &str, topic: impl Into<String>) -> Result<Self, KafkaError> {
        let producer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;
        Ok(Self {
            producer,
            topic: topic.into(),
        })
    }
}

impl EventSink for KafkaEventSink {
    fn forward(&self, event: &AppEvent) {
        let payload = match encode_event(event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("[kafka] tx: cannot encode {:?}: {}", event, e);
                return;
            }
        };
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("[kafka] tx: no runtime, dropping {:?}", event);
            return;
        };

        tracing::info!("[kafka] tx: topic: {}, message: {:?}", self.topic, event);
        let producer = self.producer.clone();
        let topic = self.topic.clone();
        handle.spawn(async move {
            let record = FutureRecord::<(), _>::to(&topic).payload(&payload);
            match producer.send(record, SEND_TIMEOUT).await {
                Ok(delivery) => tracing::info!("[kafka] tx ok: {:?}", delivery),
                Err((e, _)) => tracing::error!("[kafka] tx failed on {}: {}", topic, e),
            }
        });
    }
}

/// Add the tx-topic producer to `publisher` when brokers are configured
pub fn attach_producer(
    settings: &KafkaSettings,
    publisher: EventPublisher,
) -> Result<EventPublisher, ConfigError> {
    let Some(brokers) = &settings.brokers else {
        tracing::info!("KAFKA_BROKERS not set, events stay local");
        return Ok(publisher);
    };
    let sink = KafkaEventSink::new(brokers, settings.tx_topic.clone()).map_err(kafka_config_error)?;
    tracing::info!("[kafka] producer ready for topic {}", settings.tx_topic);
    Ok(publisher.with_sink(Arc::new(sink)))
}

/// Start the rx and keycloak consumers; none when brokers are not configured
pub fn spawn_consumers(
    settings: &KafkaSettings,
    publisher: EventPublisher,
) -> Result<Vec<JoinHandle<()>>, ConfigError> {
    let Some(brokers) = &settings.brokers else {
        return Ok(Vec::new());
    };

    let sample = subscribe(brokers, &settings.group_id, &settings.rx_topic)?;
    let keycloak = subscribe(brokers, &settings.group_id, &settings.keycloak_topic)?;

    Ok(vec![
        tokio::spawn(consume_samples(sample, publisher)),
        tokio::spawn(consume_keycloak(keycloak)),
    ])
}

fn subscribe(brokers: &str, group_id: &str, topic: &str) -> Result<StreamConsumer, ConfigError> {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", brokers)
        .set("group.id", group_id)
        .set("enable.auto.commit", "true")
        .set("auto.offset.reset", "latest")
        .create()
        .map_err(kafka_config_error)?;
    consumer.subscribe(&[topic]).map_err(kafka_config_error)?;
    Ok(consumer)
}

async fn consume_samples(consumer: StreamConsumer, publisher: EventPublisher) {
    tracing::info!("[kafka] sample: consumer starts");
    loop {
        match consumer.recv().await {
            Ok(record) => {
                tracing::debug!(
                    "[kafka] rx sample: key={:?}, topic={}, offset={}",
                    record.key(),
                    record.topic(),
                    record.offset()
                );
                if let Some(payload) = record.payload() {
                    if let Err(e) = handle_sample_record(&publisher, payload) {
                        tracing::error!("[kafka] sample: {}", e);
                    }
                }
            }
            Err(e) => tracing::error!("[kafka] sample: {}", e),
        }
    }
}

async fn consume_keycloak(consumer: StreamConsumer) {
    tracing::info!("[kafka] keycloak: consumer starts");
    loop {
        match consumer.recv().await {
            Ok(record) => {
                tracing::debug!(
                    "[kafka] rx keycloak: topic={}, offset={}",
                    record.topic(),
                    record.offset()
                );
                if let Some(payload) = record.payload() {
                    if let Err(e) = handle_keycloak_record(payload) {
                        tracing::error!("[kafka] keycloak: {}", e);
                    }
                }
            }
            Err(e) => tracing::error!("[kafka] keycloak: {}", e),
        }
    }
}

fn kafka_config_error(err: KafkaError) -> ConfigError {
    ConfigError::Invalid(format!("kafka: {}", err))
}

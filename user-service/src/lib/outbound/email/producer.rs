use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::FutureProducer;
use rdkafka::producer::FutureRecord;
use rdkafka::util::Timeout;
use thiserror::Error;

use crate::config::Config;
use crate::domain::auth::errors::EmailDispatchError;
use crate::domain::auth::models::EmailJob;
use crate::domain::auth::ports::EmailDispatcher;
use crate::outbound::email::messages::EmailJobMessage;

#[derive(Debug, Error)]
pub enum KafkaProducerError {
    #[error("Failed to send message to Kafka: {0}")]
    SendError(String),

    #[error("Failed to serialize message: {0}")]
    SerializationError(String),
}

impl From<KafkaProducerError> for EmailDispatchError {
    fn from(err: KafkaProducerError) -> Self {
        match err {
            KafkaProducerError::SerializationError(msg) => {
                EmailDispatchError::SerializationFailed(msg)
            }
            KafkaProducerError::SendError(msg) => EmailDispatchError::DeliveryFailed(msg),
        }
    }
}

/// Hands email jobs to the mail worker through a Kafka topic.
pub struct KafkaEmailDispatcher {
    producer: FutureProducer,
    topic: String,
    timeout: Duration,
}

impl KafkaEmailDispatcher {
    /// Create a new Kafka email dispatcher with "at least once" delivery semantics
    ///
    /// # Arguments
    /// * `config` - Application configuration
    ///
    /// # Notes:
    /// - `acks=all`: Wait for all in-sync replicas to acknowledge
    /// - `enable.idempotence=true`: Prevents duplicate jobs during retries
    /// - `retry.backoff.ms=100`: Backoff between retry attempts
    pub fn new(config: &Config) -> Result<Self, anyhow::Error> {
        tracing::info!(
            brokers = %config.kafka.brokers,
            topic = %config.email.topic,
            "Initializing Kafka producer for email jobs"
        );

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.kafka.brokers)
            .set("message.timeout.ms", "30000")
            .set("enable.idempotence", "true")
            .set("acks", "all")
            .set("retries", "10")
            .set("max.in.flight.requests.per.connection", "5")
            .set("retry.backoff.ms", "100")
            .create()?;

        Ok(Self {
            producer,
            topic: config.email.topic.clone(),
            timeout: Duration::from_secs(30),
        })
    }

    /// Publish a job keyed by recipient so one recipient's mail stays ordered.
    async fn publish(&self, message: &EmailJobMessage) -> Result<(), KafkaProducerError> {
        let payload = serde_json::to_string(message)
            .map_err(|e| KafkaProducerError::SerializationError(e.to_string()))?;

        let record = FutureRecord::to(&self.topic)
            .key(message.to.as_str())
            .payload(&payload);

        self.producer
            .send(record, Timeout::After(self.timeout))
            .await
            .map(|_| {
                tracing::debug!(
                    topic = %self.topic,
                    template = %message.template,
                    "Email job published"
                );
            })
            .map_err(|(err, _)| KafkaProducerError::SendError(err.to_string()))
    }
}

#[async_trait]
impl EmailDispatcher for KafkaEmailDispatcher {
    async fn send(&self, job: EmailJob) -> Result<(), EmailDispatchError> {
        let message = EmailJobMessage::from(&job);
        Ok(self.publish(&message).await?)
    }
}

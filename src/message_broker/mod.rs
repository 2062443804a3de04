// region:    --- Imports
use crate::auction::events::Event;
use crate::config::Config;
use crate::error::PublishError;
use async_trait::async_trait;
use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::DefaultClientContext;
use rdkafka::error::KafkaError;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::types::RDKafkaErrorCode;
use rdkafka::ClientConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Modules
mod memory;

pub use memory::InMemoryPublisher;

// endregion: --- Modules

// region:    --- Event Publisher
/// 메시지 버스로 이벤트 하나를 내보내는 협력자
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &Event) -> Result<(), PublishError>;
}
// endregion: --- Event Publisher

// region:    --- Kafka Producer
#[derive(Clone)]
pub struct KafkaProducer {
    producer: Arc<FutureProducer>,
    topic: String,
    queue_timeout: Duration,
}

/// KafkaProducer 구현
impl KafkaProducer {
    pub fn new(brokers: &str, topic: &str, timeout: Duration) -> Result<Self, KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", timeout.as_millis().to_string())
            .set("enable.idempotence", "true")
            .create()?;

        Ok(KafkaProducer {
            producer: Arc::new(producer),
            topic: topic.to_string(),
            queue_timeout: timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, KafkaError> {
        Self::new(
            &config.kafka_brokers,
            &config.kafka_topic,
            config.publish_timeout,
        )
    }

    /// 메시지 전송
    pub async fn send_message(
        &self,
        key: &str,
        value: &str,
        event_type: &str,
    ) -> Result<(), PublishError> {
        info!(
            "{:<12} --> Kafka 메시지 전송: topic={}, key={}, type={}",
            "Producer", self.topic, key, event_type
        );
        let headers = OwnedHeaders::new().insert(Header {
            key: "event-type",
            value: Some(event_type),
        });
        let record = FutureRecord::to(&self.topic)
            .key(key)
            .payload(value)
            .headers(headers);

        self.producer
            .send(record, self.queue_timeout)
            .await
            .map_err(|(e, _)| PublishError::Kafka(format!("Error sending message: {:?}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl EventPublisher for KafkaProducer {
    async fn publish(&self, event: &Event) -> Result<(), PublishError> {
        let payload = serde_json::to_string(event)?;
        // 같은 경매의 이벤트는 같은 파티션으로
        self.send_message(&event.aggregate_id.to_string(), &payload, &event.event_type)
            .await
    }
}
// endregion: --- Kafka Producer

// region:    --- Kafka Manager
pub struct KafkaManager {
    brokers: String,
}

/// KafkaManager 구현
impl KafkaManager {
    pub fn new(brokers: &str) -> Self {
        KafkaManager {
            brokers: brokers.to_string(),
        }
    }

    /// 토픽 생성 (이미 있으면 성공으로 본다)
    pub async fn create_topic(
        &self,
        topic_name: &str,
        num_partitions: i32,
        replication_factor: i32,
    ) -> Result<(), String> {
        info!("{:<12} --> Kafka 토픽 생성 시작: {}", "Manager", topic_name);

        let admin_client: AdminClient<DefaultClientContext> = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .create()
            .map_err(|e| format!("AdminClient 생성 실패: {:?}", e))?;

        let new_topic = NewTopic::new(
            topic_name,
            num_partitions,
            TopicReplication::Fixed(replication_factor),
        );

        let results = admin_client
            .create_topics(&[new_topic], &AdminOptions::new())
            .await
            .map_err(|e| {
                error!("{:<12} --> Kafka 토픽 생성 실패: {:?}", "Manager", e);
                format!("토픽 생성 실패: {:?}", e)
            })?;

        for result in results {
            match result {
                Ok(topic) => info!("{:<12} --> Kafka 토픽 생성 성공: {}", "Manager", topic),
                Err((topic, RDKafkaErrorCode::TopicAlreadyExists)) => {
                    info!("{:<12} --> Kafka 토픽이 이미 존재합니다: {}", "Manager", topic)
                }
                Err((topic, code)) => {
                    error!("{:<12} --> Kafka 토픽 생성 실패: {} {:?}", "Manager", topic, code);
                    return Err(format!("토픽 생성 실패: {} {:?}", topic, code));
                }
            }
        }
        Ok(())
    }
}
// endregion: --- Kafka Manager

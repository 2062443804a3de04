use super::EventPublisher;
use crate::auction::events::Event;
use crate::error::PublishError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 발행된 이벤트를 기록하는 메모리 발행자 (테스트용)
#[derive(Clone, Default)]
pub struct InMemoryPublisher {
    published: Arc<RwLock<Vec<Event>>>,
    reject_with: Arc<RwLock<Option<String>>>,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 이후 발행을 모두 거부한다
    pub async fn reject(&self, reason: &str) {
        *self.reject_with.write().await = Some(reason.to_string());
    }

    pub async fn accept(&self) {
        *self.reject_with.write().await = None;
    }

    pub async fn published(&self) -> Vec<Event> {
        self.published.read().await.clone()
    }

    /// 주어진 타입으로 발행된 이벤트
    pub async fn published_of(&self, event_type: &str) -> Vec<Event> {
        self.published
            .read()
            .await
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventPublisher for InMemoryPublisher {
    async fn publish(&self, event: &Event) -> Result<(), PublishError> {
        if let Some(reason) = self.reject_with.read().await.as_ref() {
            return Err(PublishError::Rejected(reason.clone()));
        }
        self.published.write().await.push(event.clone());
        Ok(())
    }
}

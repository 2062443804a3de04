/// outbox 릴레이
/// 커밋과 함께 outbox_messages 에 기록된 이벤트를 주기적으로 메시지 버스에 발행한다.
/// 발행 실패 시 해당 이벤트부터 다음 주기에 다시 시도한다 (at-least-once).
/// 이벤트는 선점(claim) 후 발행하므로 여러 인스턴스가 릴레이를 돌려도 같은 이벤트를 동시에 발행하지 않는다.
// region:    --- Imports
use crate::error::Result;
use crate::message_broker::EventPublisher;
use crate::store::AuctionStore;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tracing::{debug, error, info, warn};

// endregion: --- Imports

// region:    --- Outbox Relay
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);
const DEFAULT_CLAIM_TTL: Duration = Duration::from_secs(60);

pub struct OutboxRelay {
    store: Arc<dyn AuctionStore>,
    publisher: Arc<dyn EventPublisher>,
    poll_interval: Duration,
    batch_size: i64,
    claim_ttl: Duration,
}

impl OutboxRelay {
    pub fn new(
        store: Arc<dyn AuctionStore>,
        publisher: Arc<dyn EventPublisher>,
        poll_interval: Duration,
        batch_size: i64,
    ) -> Self {
        Self {
            store,
            publisher,
            // tokio interval 은 0 주기를 허용하지 않는다
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            batch_size,
            claim_ttl: DEFAULT_CLAIM_TTL,
        }
    }

    /// 선점 유지 시간. 릴레이가 죽으면 이 시간이 지난 뒤 다른 릴레이가 이어받는다.
    pub fn with_claim_ttl(mut self, claim_ttl: Duration) -> Self {
        self.claim_ttl = claim_ttl;
        self
    }

    /// 릴레이 시작
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = interval(self.poll_interval);
            loop {
                interval.tick().await;
                if let Err(e) = self.relay_pending().await {
                    error!("{:<12} --> outbox 발행 중 오류 발생: {:?}", "Outbox", e);
                }
            }
        })
    }

    /// 미발행 이벤트를 선점해 오래된 순으로 발행하고 발행된 개수를 반환한다.
    /// 첫 실패에서 멈춰 순서를 유지하고, 남은 선점은 해제한다.
    pub async fn relay_pending(&self) -> Result<usize> {
        let claimed = self
            .store
            .claim_outbox(self.batch_size, self.claim_ttl)
            .await?;
        if claimed.is_empty() {
            return Ok(0);
        }
        debug!("{:<12} --> 선점한 이벤트 {}건", "Outbox", claimed.len());

        let mut relayed = 0;
        for event in &claimed {
            if let Err(e) = self.publisher.publish(event).await {
                warn!(
                    "{:<12} --> 이벤트 발행 실패, 다음 주기에 재시도: id={}, {}",
                    "Outbox", event.id, e
                );
                break;
            }
            self.store.mark_published(&[event.id]).await?;
            relayed += 1;
        }

        if relayed < claimed.len() {
            let unpublished: Vec<_> = claimed[relayed..].iter().map(|e| e.id).collect();
            self.store.release_outbox(&unpublished).await?;
        }

        info!(
            "{:<12} --> outbox 발행 완료: {}/{}",
            "Outbox",
            relayed,
            claimed.len()
        );
        Ok(relayed)
    }
}
// endregion: --- Outbox Relay

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::events::{AuctionDeleted, AuctionEvent, Event};
    use crate::auction::model::sample_auction;
    use crate::message_broker::InMemoryPublisher;
    use crate::store::{Change, InMemoryAuctionStore};

    async fn seed(store: &InMemoryAuctionStore, count: usize) -> Vec<Event> {
        let mut events = Vec::new();
        for i in 0..count {
            let auction = sample_auction(&format!("Make{}", i));
            let event = Event::new(
                auction.id,
                &AuctionEvent::Deleted(AuctionDeleted {
                    id: auction.id.to_string(),
                }),
            )
            .unwrap();
            store
                .apply(&[Change::Add(auction)], std::slice::from_ref(&event))
                .await
                .unwrap();
            events.push(event);
        }
        events
    }

    impl OutboxRelay {
        fn with_batch(mut self, batch_size: i64) -> Self {
            self.batch_size = batch_size;
            self
        }
    }

    fn relay(store: &InMemoryAuctionStore, publisher: &InMemoryPublisher) -> OutboxRelay {
        OutboxRelay::new(
            Arc::new(store.clone()),
            Arc::new(publisher.clone()),
            Duration::from_millis(10),
            100,
        )
    }

    #[tokio::test]
    async fn test_relay_publishes_in_order_once() {
        let store = InMemoryAuctionStore::new();
        let publisher = InMemoryPublisher::new();
        let events = seed(&store, 3).await;
        let relay = relay(&store, &publisher);

        assert_eq!(relay.relay_pending().await.unwrap(), 3);
        assert_eq!(relay.relay_pending().await.unwrap(), 0);

        let ids: Vec<_> = publisher.published().await.iter().map(|e| e.id).collect();
        let expected: Vec<_> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_failed_publish_stays_pending() {
        let store = InMemoryAuctionStore::new();
        let publisher = InMemoryPublisher::new();
        seed(&store, 2).await;
        let relay = relay(&store, &publisher);

        publisher.reject("broker down").await;
        assert_eq!(relay.relay_pending().await.unwrap(), 0);
        assert_eq!(store.pending_outbox(100).await.unwrap().len(), 2);

        publisher.accept().await;
        assert_eq!(relay.relay_pending().await.unwrap(), 2);
        assert!(store.pending_outbox(100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_relays_publish_each_event_once() {
        let store = InMemoryAuctionStore::new();
        let publisher = InMemoryPublisher::new();
        let events = seed(&store, 6).await;
        let first = relay(&store, &publisher).with_batch(3);
        let second = relay(&store, &publisher).with_batch(3);

        let (a, b) = tokio::join!(first.relay_pending(), second.relay_pending());
        assert_eq!(a.unwrap() + b.unwrap(), 6);

        let mut published: Vec<_> = publisher.published().await.iter().map(|e| e.id).collect();
        let mut expected: Vec<_> = events.iter().map(|e| e.id).collect();
        published.sort();
        expected.sort();
        assert_eq!(published, expected);
        assert_eq!(first.relay_pending().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_zero_poll_interval_does_not_kill_relay() {
        let store = InMemoryAuctionStore::new();
        let publisher = InMemoryPublisher::new();
        seed(&store, 1).await;

        let handle = OutboxRelay::new(
            Arc::new(store.clone()),
            Arc::new(publisher.clone()),
            Duration::ZERO,
            10,
        )
        .start();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert!(!handle.is_finished());
        handle.abort();
        assert_eq!(publisher.published().await.len(), 1);
    }

    #[tokio::test]
    async fn test_started_relay_drains_outbox() {
        let store = InMemoryAuctionStore::new();
        let publisher = InMemoryPublisher::new();
        seed(&store, 1).await;

        let handle = relay(&store, &publisher).start();
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        handle.abort();

        assert_eq!(publisher.published().await.len(), 1);
    }
}

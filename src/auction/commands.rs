/// 경매 쓰기 경로
/// 1. 생성
/// 2. 수정
/// 3. 삭제
/// 검증 → 집합 변경 → 스테이징 → (발행/커밋, DeliveryMode 순서) → 외부 표현 반환
// region:    --- Imports
use crate::auction::dto::{AuctionDto, CreateAuctionDto, UpdateAuctionDto};
use crate::auction::events::{AuctionDeleted, AuctionEvent, AuctionUpdated, Event};
use crate::auction::model::{now, Auction};
use crate::config::{Config, DeliveryMode};
use crate::error::{AuctionError, Result};
use crate::message_broker::EventPublisher;
use crate::repository::AuctionRepository;
use tracing::{info, warn};
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Identity
/// 요청한 사용자
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(String);

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// 판매자 본인만 수정/삭제할 수 있다
    pub fn ensure_seller(&self, auction: &Auction) -> Result<()> {
        if auction.seller != self.0 {
            warn!(
                "{:<12} --> 판매자가 아닌 사용자의 요청: user={}, seller={}",
                "Command", self.0, auction.seller
            );
            return Err(AuctionError::Forbidden {
                user: self.0.clone(),
                seller: auction.seller.clone(),
            });
        }
        Ok(())
    }
}
// endregion: --- Identity

// region:    --- Commands
/// 1. 경매 생성
pub async fn handle_create_auction(
    cmd: CreateAuctionDto,
    identity: &Identity,
    repo: &mut AuctionRepository,
    publisher: &dyn EventPublisher,
    config: &Config,
) -> Result<AuctionDto> {
    info!("{:<12} --> 경매 생성 요청 처리 시작: {:?}", "Command", cmd);
    cmd.validate()?;

    let now = now();
    let auction = Auction::new(
        cmd.into_new_auction(identity.name().to_string(), now, config.default_auction_days)?,
        now,
    );
    let created = AuctionDto::from(&auction);
    repo.add_auction(auction);

    let event = Event::new(created.id, &AuctionEvent::Created(created.clone()))?;
    deliver(
        repo,
        publisher,
        config.delivery_mode,
        event,
        "Could not save changes to the DB",
    )
    .await?;

    info!("{:<12} --> 경매 생성 완료 id: {}", "Command", created.id);
    Ok(created)
}

/// 2. 경매 수정 (patch)
pub async fn handle_update_auction(
    id: Uuid,
    cmd: UpdateAuctionDto,
    identity: &Identity,
    repo: &mut AuctionRepository,
    publisher: &dyn EventPublisher,
    config: &Config,
) -> Result<()> {
    info!("{:<12} --> 경매 수정 요청 처리 시작 id: {}, {:?}", "Command", id, cmd);
    cmd.validate()?;

    let mut auction = repo
        .get_auction_by_id(id)
        .await?
        .ok_or(AuctionError::NotFound(id))?;
    identity.ensure_seller(&auction)?;

    auction.apply_update(&cmd, now());
    let event = Event::new(id, &AuctionEvent::Updated(AuctionUpdated::from(&auction)))?;
    repo.update_auction(auction);

    deliver(
        repo,
        publisher,
        config.delivery_mode,
        event,
        "Problem saving changes",
    )
    .await?;

    info!("{:<12} --> 경매 수정 완료 id: {}", "Command", id);
    Ok(())
}

/// 3. 경매 삭제
pub async fn handle_delete_auction(
    id: Uuid,
    identity: &Identity,
    repo: &mut AuctionRepository,
    publisher: &dyn EventPublisher,
    config: &Config,
) -> Result<()> {
    info!("{:<12} --> 경매 삭제 요청 처리 시작 id: {}", "Command", id);

    let auction = repo
        .get_auction_by_id(id)
        .await?
        .ok_or(AuctionError::NotFound(id))?;
    identity.ensure_seller(&auction)?;

    repo.remove_auction(&auction);
    let event = Event::new(
        id,
        &AuctionEvent::Deleted(AuctionDeleted { id: id.to_string() }),
    )?;

    deliver(
        repo,
        publisher,
        config.delivery_mode,
        event,
        "Could not update DB",
    )
    .await?;

    info!("{:<12} --> 경매 삭제 완료 id: {}", "Command", id);
    Ok(())
}
// endregion: --- Commands

// region:    --- Delivery
/// 이벤트 발행과 커밋을 설정된 순서로 수행한다
async fn deliver(
    repo: &mut AuctionRepository,
    publisher: &dyn EventPublisher,
    mode: DeliveryMode,
    event: Event,
    failure_message: &str,
) -> Result<()> {
    match mode {
        DeliveryMode::PublishThenCommit => {
            publisher.publish(&event).await?;
            // 커밋이 실패해도 이벤트는 이미 발행된 상태
            commit(repo, failure_message).await
        }
        DeliveryMode::CommitThenPublish => {
            commit(repo, failure_message).await?;
            // 발행 실패 시 커밋된 변경은 되돌리지 않는다
            publisher.publish(&event).await.map_err(|e| {
                warn!(
                    "{:<12} --> 커밋 후 발행 실패: {} ({})",
                    "Command", event.event_type, e
                );
                AuctionError::from(e)
            })
        }
        DeliveryMode::Outbox => {
            repo.add_outbox_event(event);
            commit(repo, failure_message).await
        }
    }
}

async fn commit(repo: &mut AuctionRepository, failure_message: &str) -> Result<()> {
    if repo.save_changes().await? {
        Ok(())
    } else {
        warn!("{:<12} --> 커밋 실패: {}", "Command", failure_message);
        Err(AuctionError::Persistence(failure_message.to_string()))
    }
}
// endregion: --- Delivery

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message_broker::InMemoryPublisher;
    use crate::store::{AuctionStore, InMemoryAuctionStore};
    use std::sync::Arc;

    struct Fixture {
        store: InMemoryAuctionStore,
        publisher: InMemoryPublisher,
        config: Config,
    }

    impl Fixture {
        fn new(mode: DeliveryMode) -> Self {
            Self {
                store: InMemoryAuctionStore::new(),
                publisher: InMemoryPublisher::new(),
                config: Config {
                    delivery_mode: mode,
                    ..Config::default()
                },
            }
        }

        fn repo(&self) -> AuctionRepository {
            AuctionRepository::new(Arc::new(self.store.clone()))
        }

        async fn create(&self, identity: &Identity) -> Result<AuctionDto> {
            handle_create_auction(
                create_dto(),
                identity,
                &mut self.repo(),
                &self.publisher,
                &self.config,
            )
            .await
        }
    }

    fn create_dto() -> CreateAuctionDto {
        CreateAuctionDto {
            make: "test".to_string(),
            model: "testModel".to_string(),
            year: 10,
            color: "test".to_string(),
            mileage: 10,
            image_url: "test".to_string(),
            reserve_price: 10,
            auction_end: None,
        }
    }

    fn seller() -> Identity {
        Identity::new("test")
    }

    #[tokio::test]
    async fn test_create_commits_and_publishes_once() {
        let fx = Fixture::new(DeliveryMode::CommitThenPublish);
        let created = fx.create(&seller()).await.unwrap();

        let stored = fx.store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(AuctionDto::from(&stored), created);
        assert_eq!(stored.seller, "test");

        let events = fx.publisher.published_of("AuctionCreated").await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].aggregate_id, created.id);
        assert_eq!(events[0].data["make"], "test");
    }

    #[tokio::test]
    async fn test_publish_then_commit_sends_event_even_when_commit_fails() {
        let fx = Fixture::new(DeliveryMode::PublishThenCommit);
        fx.store.fail_next_apply();

        let err = fx.create(&seller()).await.unwrap_err();
        assert!(matches!(err, AuctionError::Persistence(_)));
        assert_eq!(fx.publisher.published().await.len(), 1);
        assert!(fx.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_commit_then_publish_sends_nothing_when_commit_fails() {
        let fx = Fixture::new(DeliveryMode::CommitThenPublish);
        fx.store.fail_next_apply();

        let err = fx.create(&seller()).await.unwrap_err();
        assert!(matches!(err, AuctionError::Persistence(_)));
        assert!(fx.publisher.published().await.is_empty());
    }

    #[tokio::test]
    async fn test_publish_failure_after_commit_keeps_mutation() {
        let fx = Fixture::new(DeliveryMode::CommitThenPublish);
        fx.publisher.reject("broker down").await;

        let err = fx.create(&seller()).await.unwrap_err();
        assert!(matches!(err, AuctionError::Publish(_)));
        assert_eq!(fx.store.len().await, 1);
    }

    #[tokio::test]
    async fn test_outbox_mode_stages_event_with_commit() {
        let fx = Fixture::new(DeliveryMode::Outbox);
        let created = fx.create(&seller()).await.unwrap();

        assert!(fx.publisher.published().await.is_empty());
        let pending = fx.store.pending_outbox(10).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].event_type, "AuctionCreated");
        assert_eq!(pending[0].aggregate_id, created.id);
    }

    #[tokio::test]
    async fn test_update_patches_and_publishes() {
        let fx = Fixture::new(DeliveryMode::CommitThenPublish);
        let created = fx.create(&seller()).await.unwrap();

        handle_update_auction(
            created.id,
            UpdateAuctionDto {
                make: Some("Ford".to_string()),
                year: Some(2015),
                ..Default::default()
            },
            &seller(),
            &mut fx.repo(),
            &fx.publisher,
            &fx.config,
        )
        .await
        .unwrap();

        let stored = fx.store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.item.make, "Ford");
        assert_eq!(stored.item.year, 2015);
        assert_eq!(stored.item.model, created.model);
        assert_eq!(stored.item.mileage, created.mileage);
        assert_eq!(stored.item.color, created.color);
        assert!(stored.updated_at >= created.updated_at);

        let events = fx.publisher.published_of("AuctionUpdated").await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data["make"], "Ford");
        assert_eq!(events[0].data["model"], "testModel");
    }

    #[tokio::test]
    async fn test_update_missing_auction_touches_nothing() {
        let fx = Fixture::new(DeliveryMode::PublishThenCommit);
        let id = Uuid::new_v4();

        let err = handle_update_auction(
            id,
            UpdateAuctionDto::default(),
            &seller(),
            &mut fx.repo(),
            &fx.publisher,
            &fx.config,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AuctionError::NotFound(missing) if missing == id));
        assert!(fx.publisher.published().await.is_empty());
        assert_eq!(fx.store.apply_calls(), 0);
    }

    #[tokio::test]
    async fn test_non_seller_cannot_update_or_delete() {
        let fx = Fixture::new(DeliveryMode::PublishThenCommit);
        let created = fx.create(&Identity::new("bob")).await.unwrap();
        let alice = Identity::new("alice");

        let err = handle_update_auction(
            created.id,
            UpdateAuctionDto::default(),
            &alice,
            &mut fx.repo(),
            &fx.publisher,
            &fx.config,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AuctionError::Forbidden { .. }));

        let err = handle_delete_auction(created.id, &alice, &mut fx.repo(), &fx.publisher, &fx.config)
            .await
            .unwrap_err();
        assert!(matches!(err, AuctionError::Forbidden { .. }));

        // 생성 이벤트만 발행됨
        assert_eq!(fx.publisher.published().await.len(), 1);
        assert_eq!(fx.store.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_removes_and_publishes_id() {
        let fx = Fixture::new(DeliveryMode::CommitThenPublish);
        let created = fx.create(&seller()).await.unwrap();

        handle_delete_auction(created.id, &seller(), &mut fx.repo(), &fx.publisher, &fx.config)
            .await
            .unwrap();

        assert!(fx.store.find_by_id(created.id).await.unwrap().is_none());
        let events = fx.publisher.published_of("AuctionDeleted").await;
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].data,
            serde_json::json!({ "id": created.id.to_string() })
        );

        let err = handle_delete_auction(created.id, &seller(), &mut fx.repo(), &fx.publisher, &fx.config)
            .await
            .unwrap_err();
        assert!(matches!(err, AuctionError::NotFound(_)));
    }
}

/// 경매 저장소 파사드 (요청 단위 작업 단위)
/// add / update / remove 는 스테이징만 하고, save_changes 에서만 반영된다.
// region:    --- Imports
use crate::auction::events::Event;
use crate::auction::model::Auction;
use crate::error::Result;
use crate::store::{AuctionStore, Change};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Auction Repository
pub struct AuctionRepository {
    store: Arc<dyn AuctionStore>,
    changes: Vec<Change>,
    outbox: Vec<Event>,
}

impl AuctionRepository {
    pub fn new(store: Arc<dyn AuctionStore>) -> Self {
        Self {
            store,
            changes: Vec::new(),
            outbox: Vec::new(),
        }
    }

    /// 상품을 포함한 경매 조회
    pub async fn get_auction_by_id(&self, id: Uuid) -> Result<Option<Auction>> {
        self.store.find_by_id(id).await
    }

    /// make 오름차순 경매 목록
    pub async fn get_auctions(&self, updated_after: Option<DateTime<Utc>>) -> Result<Vec<Auction>> {
        self.store.list(updated_after).await
    }

    pub fn add_auction(&mut self, auction: Auction) {
        self.changes.push(Change::Add(auction));
    }

    pub fn update_auction(&mut self, auction: Auction) {
        self.changes.push(Change::Update(auction));
    }

    pub fn remove_auction(&mut self, auction: &Auction) {
        self.changes.push(Change::Remove(auction.id));
    }

    /// 변경과 같은 트랜잭션으로 기록될 outbox 이벤트
    pub fn add_outbox_event(&mut self, event: Event) {
        self.outbox.push(event);
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// 스테이징된 변경을 반영한다. 한 행이라도 바뀌었으면 true.
    /// 성공 여부와 관계없이 스테이징은 비워진다.
    pub async fn save_changes(&mut self) -> Result<bool> {
        let changes = std::mem::take(&mut self.changes);
        let outbox = std::mem::take(&mut self.outbox);

        if changes.is_empty() {
            warn!("{:<12} --> 저장할 변경이 없습니다", "Repository");
            return Ok(false);
        }

        let rows = self.store.apply(&changes, &outbox).await?;
        info!(
            "{:<12} --> 변경 저장: 변경 {}, 영향받은 행 {}",
            "Repository",
            changes.len(),
            rows
        );
        Ok(rows > 0)
    }
}
// endregion: --- Auction Repository

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::sample_auction;
    use crate::store::InMemoryAuctionStore;

    #[tokio::test]
    async fn test_add_is_invisible_until_saved() {
        let store = InMemoryAuctionStore::new();
        let mut repo = AuctionRepository::new(Arc::new(store.clone()));
        let auction = sample_auction("Ford");

        repo.add_auction(auction.clone());
        assert!(repo.get_auction_by_id(auction.id).await.unwrap().is_none());

        assert!(repo.save_changes().await.unwrap());
        assert_eq!(
            repo.get_auction_by_id(auction.id).await.unwrap(),
            Some(auction)
        );
    }

    #[tokio::test]
    async fn test_save_without_changes_is_false() {
        let store = InMemoryAuctionStore::new();
        let mut repo = AuctionRepository::new(Arc::new(store.clone()));

        assert!(!repo.save_changes().await.unwrap());
        assert_eq!(store.apply_calls(), 0);
    }

    #[tokio::test]
    async fn test_staging_cleared_after_save() {
        let store = InMemoryAuctionStore::new();
        let mut repo = AuctionRepository::new(Arc::new(store.clone()));
        let auction = sample_auction("Ford");

        repo.add_auction(auction.clone());
        assert!(repo.has_changes());
        repo.save_changes().await.unwrap();
        assert!(!repo.has_changes());

        repo.remove_auction(&auction);
        assert!(repo.save_changes().await.unwrap());
        assert!(store.is_empty().await);

        // 이미 삭제된 경매를 다시 삭제하면 영향받은 행이 없다
        repo.remove_auction(&auction);
        assert!(!repo.save_changes().await.unwrap());
    }

    #[tokio::test]
    async fn test_separate_repositories_do_not_share_staging() {
        let store: Arc<dyn AuctionStore> = Arc::new(InMemoryAuctionStore::new());
        let mut first = AuctionRepository::new(Arc::clone(&store));
        let mut second = AuctionRepository::new(Arc::clone(&store));

        first.add_auction(sample_auction("Ford"));
        assert!(!second.has_changes());
        assert!(!second.save_changes().await.unwrap());
        assert!(first.save_changes().await.unwrap());
    }
}

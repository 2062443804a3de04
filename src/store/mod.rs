/// 경매 저장소 (관계형 저장소 협력자) 계약
// region:    --- Imports
use crate::auction::events::Event;
use crate::auction::model::Auction;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Modules
mod memory;
mod postgres;

pub use memory::InMemoryAuctionStore;
pub use postgres::PgAuctionStore;

// endregion: --- Modules

// region:    --- Store Trait
/// 하나의 작업 단위에 쌓인 변경
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Add(Auction),
    Update(Auction),
    Remove(Uuid),
}

#[async_trait]
pub trait AuctionStore: Send + Sync {
    /// 상품을 포함한 경매 조회
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Auction>>;

    /// make 오름차순(동률은 id), updated_after 가 있으면 그 이후 수정된 경매만
    async fn list(&self, updated_after: Option<DateTime<Utc>>) -> Result<Vec<Auction>>;

    /// 변경과 outbox 이벤트를 하나의 트랜잭션으로 반영한다.
    /// 반환값은 영향받은 경매 행 수이며, 0 이면 아무것도 기록되지 않는다.
    async fn apply(&self, changes: &[Change], outbox: &[Event]) -> Result<u64>;

    /// 아직 발행되지 않은 outbox 이벤트 (오래된 순, 선점 여부와 무관)
    async fn pending_outbox(&self, limit: i64) -> Result<Vec<Event>>;

    /// 미발행이면서 다른 릴레이가 선점하지 않은 이벤트를 claim_ttl 동안 선점한다 (오래된 순).
    /// 여러 릴레이가 동시에 호출해도 같은 이벤트를 두 번 돌려주지 않는다.
    async fn claim_outbox(&self, limit: i64, claim_ttl: Duration) -> Result<Vec<Event>>;

    /// 발행하지 못한 이벤트의 선점 해제
    async fn release_outbox(&self, ids: &[Uuid]) -> Result<()>;

    async fn mark_published(&self, ids: &[Uuid]) -> Result<()>;
}
// endregion: --- Store Trait

// region:    --- Imports
use super::{AuctionStore, Change};
use crate::auction::events::Event;
use crate::auction::model::{now, Auction};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

// endregion: --- Imports

struct OutboxEntry {
    event: Event,
    published: bool,
    claimed_until: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct State {
    auctions: HashMap<Uuid, Auction>,
    outbox: Vec<OutboxEntry>,
}

/// 테스트용 메모리 저장소. PgAuctionStore 와 같은 의미를 가진다.
#[derive(Clone, Default)]
pub struct InMemoryAuctionStore {
    state: Arc<RwLock<State>>,
    fail_next_apply: Arc<AtomicBool>,
    apply_calls: Arc<AtomicUsize>,
}

impl InMemoryAuctionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 다음 apply 가 아무 행에도 영향을 주지 않도록 한다
    pub fn fail_next_apply(&self) {
        self.fail_next_apply.store(true, Ordering::SeqCst);
    }

    /// apply 호출 횟수 (커밋 시도 횟수)
    pub fn apply_calls(&self) -> usize {
        self.apply_calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.auctions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// 발행 여부와 관계없이 outbox 전체
    pub async fn outbox(&self) -> Vec<(Event, bool)> {
        self.state
            .read()
            .await
            .outbox
            .iter()
            .map(|entry| (entry.event.clone(), entry.published))
            .collect()
    }
}

#[async_trait]
impl AuctionStore for InMemoryAuctionStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Auction>> {
        Ok(self.state.read().await.auctions.get(&id).cloned())
    }

    async fn list(&self, updated_after: Option<DateTime<Utc>>) -> Result<Vec<Auction>> {
        let state = self.state.read().await;
        let mut auctions: Vec<Auction> = state
            .auctions
            .values()
            .filter(|a| updated_after.map_or(true, |t| a.updated_at > t))
            .cloned()
            .collect();
        auctions.sort_by(|a, b| a.item.make.cmp(&b.item.make).then(a.id.cmp(&b.id)));
        Ok(auctions)
    }

    async fn apply(&self, changes: &[Change], outbox: &[Event]) -> Result<u64> {
        self.apply_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_apply.swap(false, Ordering::SeqCst) {
            return Ok(0);
        }

        let mut state = self.state.write().await;
        let mut next = state.auctions.clone();
        let mut rows = 0;

        for change in changes {
            match change {
                Change::Add(auction) => {
                    if !next.contains_key(&auction.id) {
                        next.insert(auction.id, auction.clone());
                        rows += 1;
                    }
                }
                Change::Update(auction) => {
                    if let Some(existing) = next.get_mut(&auction.id) {
                        *existing = auction.clone();
                        rows += 1;
                    }
                }
                Change::Remove(id) => {
                    if next.remove(id).is_some() {
                        rows += 1;
                    }
                }
            }
        }

        if rows == 0 {
            return Ok(0);
        }

        state.auctions = next;
        state.outbox.extend(outbox.iter().cloned().map(|event| OutboxEntry {
            event,
            published: false,
            claimed_until: None,
        }));
        Ok(rows)
    }

    async fn pending_outbox(&self, limit: i64) -> Result<Vec<Event>> {
        let state = self.state.read().await;
        let mut pending: Vec<Event> = state
            .outbox
            .iter()
            .filter(|entry| !entry.published)
            .map(|entry| entry.event.clone())
            .collect();
        pending.sort_by_key(|e| e.timestamp);
        pending.truncate(limit.max(0) as usize);
        Ok(pending)
    }

    async fn claim_outbox(&self, limit: i64, claim_ttl: Duration) -> Result<Vec<Event>> {
        let now = now();
        let until = chrono::Duration::from_std(claim_ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let mut state = self.state.write().await;
        let mut claimable: Vec<&mut OutboxEntry> = state
            .outbox
            .iter_mut()
            .filter(|entry| !entry.published && entry.claimed_until.map_or(true, |t| t < now))
            .collect();
        claimable.sort_by_key(|entry| entry.event.timestamp);

        Ok(claimable
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|entry| {
                entry.claimed_until = Some(until);
                entry.event.clone()
            })
            .collect())
    }

    async fn release_outbox(&self, ids: &[Uuid]) -> Result<()> {
        let mut state = self.state.write().await;
        for entry in state.outbox.iter_mut() {
            if ids.contains(&entry.event.id) {
                entry.claimed_until = None;
            }
        }
        Ok(())
    }

    async fn mark_published(&self, ids: &[Uuid]) -> Result<()> {
        let mut state = self.state.write().await;
        for entry in state.outbox.iter_mut() {
            if ids.contains(&entry.event.id) {
                entry.published = true;
                entry.claimed_until = None;
            }
        }
        Ok(())
    }
}

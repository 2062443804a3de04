// region:    --- Imports
use super::{AuctionStore, Change};
use crate::auction::events::Event;
use crate::auction::model::{now, Auction, Item, Status};
use crate::error::{AuctionError, Result};
use crate::query::queries;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Rows
/// auctions JOIN items 한 행
#[derive(FromRow)]
struct AuctionRow {
    id: Uuid,
    reserve_price: i64,
    seller: String,
    winner: Option<String>,
    sold_amount: Option<i64>,
    current_high_bid: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    auction_end: DateTime<Utc>,
    status: String,
    item_id: Uuid,
    make: String,
    model: String,
    year: i32,
    color: String,
    mileage: i32,
    image_url: String,
}

impl TryFrom<AuctionRow> for Auction {
    type Error = AuctionError;

    fn try_from(row: AuctionRow) -> Result<Self> {
        let status = row
            .status
            .parse::<Status>()
            .map_err(|e| AuctionError::Database(sqlx::Error::Decode(e.into())))?;
        Ok(Auction {
            id: row.id,
            reserve_price: row.reserve_price,
            seller: row.seller,
            winner: row.winner,
            sold_amount: row.sold_amount,
            current_high_bid: row.current_high_bid,
            created_at: row.created_at,
            updated_at: row.updated_at,
            auction_end: row.auction_end,
            status,
            item: Item {
                id: row.item_id,
                make: row.make,
                model: row.model,
                year: row.year,
                color: row.color,
                mileage: row.mileage,
                image_url: row.image_url,
            },
        })
    }
}

#[derive(FromRow)]
struct OutboxRow {
    id: Uuid,
    aggregate_id: Uuid,
    event_type: String,
    data: serde_json::Value,
    timestamp: DateTime<Utc>,
}

impl From<OutboxRow> for Event {
    fn from(row: OutboxRow) -> Self {
        Event {
            id: row.id,
            aggregate_id: row.aggregate_id,
            event_type: row.event_type,
            data: row.data,
            timestamp: row.timestamp,
        }
    }
}
// endregion: --- Rows

// region:    --- Postgres Store
pub struct PgAuctionStore {
    pool: Arc<PgPool>,
}

impl PgAuctionStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn insert(tx: &mut Transaction<'_, Postgres>, auction: &Auction) -> Result<u64> {
        let rows = sqlx::query(queries::INSERT_AUCTION)
            .bind(auction.id)
            .bind(auction.reserve_price)
            .bind(&auction.seller)
            .bind(&auction.winner)
            .bind(auction.sold_amount)
            .bind(auction.current_high_bid)
            .bind(auction.created_at)
            .bind(auction.updated_at)
            .bind(auction.auction_end)
            .bind(auction.status.as_str())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        if rows > 0 {
            let item = &auction.item;
            sqlx::query(queries::INSERT_ITEM)
                .bind(item.id)
                .bind(auction.id)
                .bind(&item.make)
                .bind(&item.model)
                .bind(item.year)
                .bind(&item.color)
                .bind(item.mileage)
                .bind(&item.image_url)
                .execute(&mut **tx)
                .await?;
        }
        Ok(rows)
    }

    async fn update(tx: &mut Transaction<'_, Postgres>, auction: &Auction) -> Result<u64> {
        let rows = sqlx::query(queries::UPDATE_AUCTION)
            .bind(auction.id)
            .bind(auction.updated_at)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        if rows > 0 {
            let item = &auction.item;
            sqlx::query(queries::UPDATE_ITEM)
                .bind(auction.id)
                .bind(&item.make)
                .bind(&item.model)
                .bind(&item.color)
                .bind(item.mileage)
                .bind(item.year)
                .execute(&mut **tx)
                .await?;
        }
        Ok(rows)
    }

    async fn remove(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<u64> {
        let rows = sqlx::query(queries::DELETE_AUCTION)
            .bind(id)
            .execute(&mut **tx)
            .await?
            .rows_affected();
        Ok(rows)
    }
}

#[async_trait]
impl AuctionStore for PgAuctionStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Auction>> {
        debug!("{:<12} --> 경매 조회 id: {}", "Store", id);
        let sql = queries::get_auction();
        let row = sqlx::query_as::<_, AuctionRow>(&sql)
            .bind(id)
            .fetch_optional(&*self.pool)
            .await?;
        row.map(Auction::try_from).transpose()
    }

    async fn list(&self, updated_after: Option<DateTime<Utc>>) -> Result<Vec<Auction>> {
        debug!("{:<12} --> 경매 목록 조회 after: {:?}", "Store", updated_after);
        let sql = queries::get_auctions();
        let rows = sqlx::query_as::<_, AuctionRow>(&sql)
            .bind(updated_after)
            .fetch_all(&*self.pool)
            .await?;
        rows.into_iter().map(Auction::try_from).collect()
    }

    async fn apply(&self, changes: &[Change], outbox: &[Event]) -> Result<u64> {
        // 트랜잭션 시작
        let mut tx = self.pool.begin().await?;
        let mut rows = 0;

        for change in changes {
            rows += match change {
                Change::Add(auction) => Self::insert(&mut tx, auction).await?,
                Change::Update(auction) => Self::update(&mut tx, auction).await?,
                Change::Remove(id) => Self::remove(&mut tx, *id).await?,
            };
        }

        if rows == 0 {
            // 롤백
            tx.rollback().await?;
            info!("{:<12} --> 변경된 행이 없어 롤백", "Store");
            return Ok(0);
        }

        for event in outbox {
            sqlx::query(queries::INSERT_OUTBOX)
                .bind(event.id)
                .bind(event.aggregate_id)
                .bind(&event.event_type)
                .bind(&event.data)
                .bind(event.timestamp)
                .execute(&mut *tx)
                .await?;
        }

        // 트랜잭션 커밋
        tx.commit().await?;
        debug!(
            "{:<12} --> 커밋 완료: 경매 행 {}, outbox {}",
            "Store",
            rows,
            outbox.len()
        );
        Ok(rows)
    }

    async fn pending_outbox(&self, limit: i64) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, OutboxRow>(queries::GET_PENDING_OUTBOX)
            .bind(limit)
            .fetch_all(&*self.pool)
            .await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn claim_outbox(&self, limit: i64, claim_ttl: Duration) -> Result<Vec<Event>> {
        let now = now();
        let until = chrono::Duration::from_std(claim_ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let rows = sqlx::query_as::<_, OutboxRow>(queries::CLAIM_PENDING_OUTBOX)
            .bind(limit)
            .bind(until)
            .bind(now)
            .fetch_all(&*self.pool)
            .await?;

        // RETURNING 은 순서를 보장하지 않는다
        let mut events: Vec<Event> = rows.into_iter().map(Event::from).collect();
        events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        debug!("{:<12} --> outbox 선점 {}건", "Store", events.len());
        Ok(events)
    }

    async fn release_outbox(&self, ids: &[Uuid]) -> Result<()> {
        sqlx::query(queries::RELEASE_OUTBOX)
            .bind(ids)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    async fn mark_published(&self, ids: &[Uuid]) -> Result<()> {
        sqlx::query(queries::MARK_OUTBOX_PUBLISHED)
            .bind(ids)
            .bind(now())
            .execute(&*self.pool)
            .await?;
        Ok(())
    }
}
// endregion: --- Postgres Store

use crate::auction::dto::AuctionDto;
use crate::auction::model::Auction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// 경매 생성 이벤트 (외부 표현 전체)
pub type AuctionCreated = AuctionDto;

// 경매 수정 이벤트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionUpdated {
    pub id: String,
    pub make: String,
    pub model: String,
    pub color: String,
    pub mileage: i32,
    pub year: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<&Auction> for AuctionUpdated {
    fn from(auction: &Auction) -> Self {
        Self {
            id: auction.id.to_string(),
            make: auction.item.make.clone(),
            model: auction.item.model.clone(),
            color: auction.item.color.clone(),
            mileage: auction.item.mileage,
            year: auction.item.year,
            updated_at: auction.updated_at,
        }
    }
}

// 경매 삭제 이벤트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionDeleted {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuctionEvent {
    Created(AuctionCreated),
    Updated(AuctionUpdated),
    Deleted(AuctionDeleted),
}

impl AuctionEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            AuctionEvent::Created(_) => "AuctionCreated",
            AuctionEvent::Updated(_) => "AuctionUpdated",
            AuctionEvent::Deleted(_) => "AuctionDeleted",
        }
    }

    /// 이벤트 본문만 JSON 으로 (envelope 의 data 필드)
    pub fn to_data(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            AuctionEvent::Created(e) => serde_json::to_value(e),
            AuctionEvent::Updated(e) => serde_json::to_value(e),
            AuctionEvent::Deleted(e) => serde_json::to_value(e),
        }
    }
}

// region:    --- Event Envelope
/// 메시지 버스 / outbox 에 실리는 이벤트
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub aggregate_id: Uuid,
    pub event_type: String,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(aggregate_id: Uuid, event: &AuctionEvent) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: Uuid::new_v4(),
            aggregate_id,
            event_type: event.event_type().to_string(),
            data: event.to_data()?,
            timestamp: crate::auction::model::now(),
        })
    }
}
// endregion: --- Event Envelope

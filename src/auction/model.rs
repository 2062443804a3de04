use crate::auction::dto::UpdateAuctionDto;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 저장소 정밀도(마이크로초)에 맞춘 현재 시각
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

// 경매 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Status {
    #[default]
    Live,
    Finished,
    ReserveNotMet,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Live => "Live",
            Status::Finished => "Finished",
            Status::ReserveNotMet => "ReserveNotMet",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Live" => Ok(Status::Live),
            "Finished" => Ok(Status::Finished),
            "ReserveNotMet" => Ok(Status::ReserveNotMet),
            other => Err(format!("알 수 없는 경매 상태: {}", other)),
        }
    }
}

// 상품 모델 (경매와 1:1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub mileage: i32,
    pub image_url: String,
}

// 경매 모델 (aggregate root)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auction {
    pub id: Uuid,
    pub reserve_price: i64,
    pub seller: String,
    pub winner: Option<String>,
    pub sold_amount: Option<i64>,
    pub current_high_bid: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub auction_end: DateTime<Utc>,
    pub status: Status,
    pub item: Item,
}

/// 새 경매 생성에 필요한 값
#[derive(Debug, Clone)]
pub struct NewAuction {
    pub seller: String,
    pub reserve_price: i64,
    pub auction_end: DateTime<Utc>,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub mileage: i32,
    pub image_url: String,
}

impl Auction {
    /// 경매와 상품을 함께 생성한다
    pub fn new(new: NewAuction, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            reserve_price: new.reserve_price,
            seller: new.seller,
            winner: None,
            sold_amount: None,
            current_high_bid: None,
            created_at: now,
            updated_at: now,
            auction_end: new.auction_end,
            status: Status::default(),
            item: Item {
                id: Uuid::new_v4(),
                make: new.make,
                model: new.model,
                year: new.year,
                color: new.color,
                mileage: new.mileage,
                image_url: new.image_url,
            },
        }
    }

    /// 부분 수정: 값이 있는 필드만 덮어쓰고 updated_at 을 갱신한다
    pub fn apply_update(&mut self, update: &UpdateAuctionDto, now: DateTime<Utc>) {
        let item = &mut self.item;
        if let Some(make) = &update.make {
            item.make = make.clone();
        }
        if let Some(model) = &update.model {
            item.model = model.clone();
        }
        if let Some(color) = &update.color {
            item.color = color.clone();
        }
        if let Some(mileage) = update.mileage {
            item.mileage = mileage;
        }
        if let Some(year) = update.year {
            item.year = year;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
pub(crate) fn sample_auction(make: &str) -> Auction {
    Auction::new(
        NewAuction {
            seller: "test".to_string(),
            reserve_price: 10,
            auction_end: now() + chrono::Duration::days(7),
            make: make.to_string(),
            model: "testModel".to_string(),
            year: 2020,
            color: "white".to_string(),
            mileage: 10,
            image_url: "https://cdn.example.com/car.png".to_string(),
        },
        now(),
    )
}

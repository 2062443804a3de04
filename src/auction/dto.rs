/// 외부(프론트엔드, 메시지 버스)로 노출되는 경매 표현과 요청 모델
// region:    --- Imports
use crate::auction::model::{Auction, NewAuction};
use crate::error::AuctionError;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Response DTO
/// 경매 + 상품을 평탄화한 조회 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionDto {
    pub id: Uuid,
    pub reserve_price: i64,
    pub seller: String,
    pub winner: Option<String>,
    pub sold_amount: i64,
    pub current_high_bid: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub auction_end: DateTime<Utc>,
    pub status: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub mileage: i32,
    pub image_url: String,
}

impl From<&Auction> for AuctionDto {
    fn from(auction: &Auction) -> Self {
        Self {
            id: auction.id,
            reserve_price: auction.reserve_price,
            seller: auction.seller.clone(),
            winner: auction.winner.clone(),
            sold_amount: auction.sold_amount.unwrap_or(0),
            current_high_bid: auction.current_high_bid.unwrap_or(0),
            created_at: auction.created_at,
            updated_at: auction.updated_at,
            auction_end: auction.auction_end,
            status: auction.status.to_string(),
            make: auction.item.make.clone(),
            model: auction.item.model.clone(),
            year: auction.item.year,
            color: auction.item.color.clone(),
            mileage: auction.item.mileage,
            image_url: auction.item.image_url.clone(),
        }
    }
}
// endregion: --- Response DTO

// region:    --- Request DTOs
/// 경매 생성 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAuctionDto {
    pub make: String,
    pub model: String,
    pub year: i32,
    #[serde(default)]
    pub color: String,
    pub mileage: i32,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub reserve_price: i64,
    #[serde(default)]
    pub auction_end: Option<DateTime<Utc>>,
}

impl CreateAuctionDto {
    pub fn validate(&self) -> Result<(), AuctionError> {
        require_not_blank("make", &self.make)?;
        require_not_blank("model", &self.model)?;
        require_non_negative("mileage", self.mileage as i64)?;
        require_non_negative("reservePrice", self.reserve_price)?;
        Ok(())
    }

    /// 검증된 요청을 도메인 생성 값으로 변환.
    /// auction_end 는 저장소 정밀도(마이크로초)로 자른다.
    pub fn into_new_auction(
        self,
        seller: String,
        now: DateTime<Utc>,
        default_days: i64,
    ) -> Result<NewAuction, AuctionError> {
        let auction_end = match self.auction_end {
            Some(end) => end.trunc_subsecs(6),
            None => Duration::try_days(default_days)
                .and_then(|days| now.checked_add_signed(days))
                .ok_or_else(|| {
                    AuctionError::Validation(format!(
                        "경매 기간이 범위를 벗어났습니다: {}일",
                        default_days
                    ))
                })?,
        };

        Ok(NewAuction {
            seller,
            reserve_price: self.reserve_price,
            auction_end,
            make: self.make,
            model: self.model,
            year: self.year,
            color: self.color,
            mileage: self.mileage,
            image_url: self.image_url,
        })
    }
}

/// 경매 수정 요청 (patch: 없는 필드는 유지)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuctionDto {
    pub make: Option<String>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub mileage: Option<i32>,
    pub year: Option<i32>,
}

impl UpdateAuctionDto {
    pub fn validate(&self) -> Result<(), AuctionError> {
        if let Some(make) = &self.make {
            require_not_blank("make", make)?;
        }
        if let Some(model) = &self.model {
            require_not_blank("model", model)?;
        }
        if let Some(mileage) = self.mileage {
            require_non_negative("mileage", mileage as i64)?;
        }
        Ok(())
    }
}

fn require_not_blank(field: &str, value: &str) -> Result<(), AuctionError> {
    if value.trim().is_empty() {
        return Err(AuctionError::Validation(format!("{} 값이 비어 있습니다", field)));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: i64) -> Result<(), AuctionError> {
    if value < 0 {
        return Err(AuctionError::Validation(format!(
            "{} 값은 0 이상이어야 합니다: {}",
            field, value
        )));
    }
    Ok(())
}
// endregion: --- Request DTOs

// region:    --- Imports
use crate::auction::dto::AuctionDto;
use crate::error::{AuctionError, Result};
use crate::repository::AuctionRepository;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Date Filter
/// `?date=` 값 해석. 빈 값은 필터 없음.
/// RFC 3339, 시간대 없는 날짜-시각(UTC), 날짜만(UTC 자정)을 받는다.
pub fn parse_date_filter(raw: &str) -> Result<Option<DateTime<Utc>>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(naive.and_utc()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Some(midnight.and_utc()));
        }
    }

    Err(AuctionError::Validation(format!(
        "날짜 형식이 올바르지 않습니다: {}",
        raw
    )))
}
// endregion: --- Date Filter

// region:    --- Query Handlers

/// 모든 경매 조회 (date 이후 수정된 것만)
pub async fn get_all_auctions(
    repo: &AuctionRepository,
    date: Option<&str>,
) -> Result<Vec<AuctionDto>> {
    info!("{:<12} --> 모든 경매 조회 date: {:?}", "Query", date);
    let updated_after = match date {
        Some(raw) => parse_date_filter(raw)?,
        None => None,
    };

    let auctions = repo.get_auctions(updated_after).await?;
    Ok(auctions.iter().map(AuctionDto::from).collect())
}

/// 경매 조회
pub async fn get_auction_by_id(repo: &AuctionRepository, id: Uuid) -> Result<AuctionDto> {
    info!("{:<12} --> 경매 조회 id: {}", "Query", id);
    repo.get_auction_by_id(id)
        .await?
        .map(|auction| AuctionDto::from(&auction))
        .ok_or(AuctionError::NotFound(id))
}

// endregion: --- Query Handlers

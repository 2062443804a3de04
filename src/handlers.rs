// region:    --- Imports
use crate::auction::commands::{self, Identity};
use crate::auction::dto::{AuctionDto, CreateAuctionDto, UpdateAuctionDto};
use crate::error::AuctionError;
use crate::extract::{AppJson, AppPath};
use crate::query;
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

/// 인증된 사용자 이름 헤더
pub const USER_HEADER: &str = "x-user-name";

#[derive(Debug, Deserialize)]
pub struct AuctionQuery {
    pub date: Option<String>,
}

/// 헤더의 사용자, 없으면 설정된 기본 판매자
fn identity(headers: &HeaderMap, state: &AppState) -> Identity {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(Identity::new)
        .unwrap_or_else(|| Identity::new(state.config.default_seller.clone()))
}

// region:    --- Command Handlers

/// 경매 생성 요청 처리
pub async fn handle_create_auction(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AppJson(cmd): AppJson<CreateAuctionDto>,
) -> Result<impl IntoResponse, AuctionError> {
    let identity = identity(&headers, &state);
    info!("{:<12} --> 경매 생성 요청 user: {}", "Handler", identity.name());

    let mut repo = state.repository();
    let created = commands::handle_create_auction(
        cmd,
        &identity,
        &mut repo,
        state.publisher.as_ref(),
        &state.config,
    )
    .await?;

    let location = format!("/api/auctions/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

/// 경매 수정 요청 처리
pub async fn handle_update_auction(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<Uuid>,
    headers: HeaderMap,
    AppJson(cmd): AppJson<UpdateAuctionDto>,
) -> Result<StatusCode, AuctionError> {
    let identity = identity(&headers, &state);
    info!(
        "{:<12} --> 경매 수정 요청 id: {}, user: {}",
        "Handler",
        id,
        identity.name()
    );

    let mut repo = state.repository();
    commands::handle_update_auction(
        id,
        cmd,
        &identity,
        &mut repo,
        state.publisher.as_ref(),
        &state.config,
    )
    .await?;
    Ok(StatusCode::OK)
}

/// 경매 삭제 요청 처리
pub async fn handle_delete_auction(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, AuctionError> {
    let identity = identity(&headers, &state);
    info!(
        "{:<12} --> 경매 삭제 요청 id: {}, user: {}",
        "Handler",
        id,
        identity.name()
    );

    let mut repo = state.repository();
    commands::handle_delete_auction(
        id,
        &identity,
        &mut repo,
        state.publisher.as_ref(),
        &state.config,
    )
    .await?;
    Ok(StatusCode::OK)
}

// endregion: --- Command Handlers

// region:    --- Query Handlers

/// 모든 경매 조회
pub async fn handle_get_auctions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuctionQuery>,
) -> Result<Json<Vec<AuctionDto>>, AuctionError> {
    info!("{:<12} --> 모든 경매 조회", "HandlerQuery");
    let repo = state.repository();
    let auctions = query::handlers::get_all_auctions(&repo, params.date.as_deref()).await?;
    Ok(Json(auctions))
}

/// 경매 조회
pub async fn handle_get_auction(
    State(state): State<Arc<AppState>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<AuctionDto>, AuctionError> {
    info!("{:<12} --> 경매 조회 id: {}", "HandlerQuery", id);
    let repo = state.repository();
    let auction = query::handlers::get_auction_by_id(&repo, id).await?;
    Ok(Json(auction))
}

pub async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// endregion: --- Query Handlers

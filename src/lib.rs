pub mod auction;
pub mod config;
pub mod database;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod message_broker;
pub mod outbox;
pub mod query;
pub mod repository;
pub mod store;

// region:    --- Imports
use axum::routing::get;
use axum::Router;
use config::Config;
use message_broker::EventPublisher;
use repository::AuctionRepository;
use std::sync::Arc;
use store::AuctionStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

// endregion: --- Imports

// region:    --- App State
/// 핸들러 공유 상태
pub struct AppState {
    pub store: Arc<dyn AuctionStore>,
    pub publisher: Arc<dyn EventPublisher>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        store: Arc<dyn AuctionStore>,
        publisher: Arc<dyn EventPublisher>,
        config: Config,
    ) -> Self {
        Self {
            store,
            publisher,
            config,
        }
    }

    /// 요청마다 새 작업 단위
    pub fn repository(&self) -> AuctionRepository {
        AuctionRepository::new(Arc::clone(&self.store))
    }
}
// endregion: --- App State

// region:    --- Router
pub fn create_app(state: Arc<AppState>) -> Router {
    // 프론트엔드를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let request_timeout = state.config.request_timeout;

    Router::new()
        .route("/health", get(handlers::handle_health))
        .route(
            "/api/auctions",
            get(handlers::handle_get_auctions).post(handlers::handle_create_auction),
        )
        .route(
            "/api/auctions/:id",
            get(handlers::handle_get_auction)
                .put(handlers::handle_update_auction)
                .delete(handlers::handle_delete_auction),
        )
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
// endregion: --- Router

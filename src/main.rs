// region:    --- Imports
use auction_listing_service::config::{Config, DeliveryMode};
use auction_listing_service::database::DatabaseManager;
use auction_listing_service::message_broker::{EventPublisher, KafkaManager, KafkaProducer};
use auction_listing_service::outbox::OutboxRelay;
use auction_listing_service::store::{AuctionStore, PgAuctionStore};
use auction_listing_service::{create_app, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .without_time()
        .with_target(false)
        .init();

    let config = Config::from_env()?;
    info!(
        "{:<12} --> 설정 로드: delivery={:?}, topic={}",
        "Main", config.delivery_mode, config.kafka_topic
    );

    // DatabaseManager 생성
    let db_manager = DatabaseManager::connect(&config).await?;

    // 스키마 생성
    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // Kafka 토픽 및 프로듀서
    KafkaManager::new(&config.kafka_brokers)
        .create_topic(&config.kafka_topic, config.kafka_partitions, 1)
        .await?;
    let publisher: Arc<dyn EventPublisher> = Arc::new(KafkaProducer::from_config(&config)?);
    info!("{:<12} --> Kafka 초기화 성공", "Main");

    let store: Arc<dyn AuctionStore> = Arc::new(PgAuctionStore::new(db_manager.get_pool()));

    // outbox 모드일 때만 릴레이 시작
    if config.delivery_mode == DeliveryMode::Outbox {
        OutboxRelay::new(
            Arc::clone(&store),
            Arc::clone(&publisher),
            config.outbox_poll_interval,
            config.outbox_batch_size,
        )
        .with_claim_ttl(config.outbox_claim_ttl)
        .start();
        info!("{:<12} --> outbox 릴레이 시작", "Main");
    }

    let addr = config.addr();
    let state = Arc::new(AppState::new(store, publisher, config));
    let routes_all = create_app(state);

    let listener = TcpListener::bind(&addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    info!("{:<12} --> 서버 종료", "Main");
    Ok(())
}

/// Ctrl-C 또는 SIGTERM 대기
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("{:<12} --> SIGINT 핸들러 설치 실패: {}", "Main", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("{:<12} --> SIGTERM 핸들러 설치 실패: {}", "Main", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("{:<12} --> SIGINT 수신, 종료 시작", "Main"),
        () = terminate => info!("{:<12} --> SIGTERM 수신, 종료 시작", "Main"),
    }
}
// endregion: --- Main

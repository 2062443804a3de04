/// 환경 변수 기반 서비스 설정
// region:    --- Imports
use crate::error::ConfigError;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

// endregion: --- Imports

// region:    --- Delivery Mode
/// 저장소 커밋과 이벤트 발행의 순서
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    /// 발행 후 커밋 (커밋 실패 시에도 이벤트는 이미 나간 상태)
    PublishThenCommit,
    /// 커밋 후 발행
    #[default]
    CommitThenPublish,
    /// 같은 트랜잭션으로 outbox 테이블에 기록, 릴레이가 발행
    Outbox,
}

impl FromStr for DeliveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "publish-then-commit" => Ok(DeliveryMode::PublishThenCommit),
            "commit-then-publish" => Ok(DeliveryMode::CommitThenPublish),
            "outbox" => Ok(DeliveryMode::Outbox),
            other => Err(other.to_string()),
        }
    }
}
// endregion: --- Delivery Mode

// region:    --- Config
const MIN_AUCTION_DAYS: i64 = 1;
const MAX_AUCTION_DAYS: i64 = 36_500;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub kafka_brokers: String,
    pub kafka_topic: String,
    pub kafka_partitions: i32,
    pub publish_timeout: Duration,
    pub delivery_mode: DeliveryMode,
    pub outbox_poll_interval: Duration,
    pub outbox_batch_size: i64,
    pub outbox_claim_ttl: Duration,
    pub default_seller: String,
    pub default_auction_days: i64,
    pub request_timeout: Duration,
    pub host: String,
    pub port: u16,
}

impl Config {
    /// 환경 변수에서 설정을 읽는다. DATABASE_URL 외에는 기본값이 있다.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let delivery_mode = match lookup("DELIVERY_MODE") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "DELIVERY_MODE",
                value,
            })?,
            None => defaults.delivery_mode,
        };

        Ok(Self {
            database_url,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
            kafka_brokers: lookup("KAFKA_BROKERS").unwrap_or(defaults.kafka_brokers),
            kafka_topic: lookup("KAFKA_TOPIC").unwrap_or(defaults.kafka_topic),
            kafka_partitions: parse_or(&lookup, "KAFKA_PARTITIONS", defaults.kafka_partitions)?,
            publish_timeout: Duration::from_millis(parse_or(&lookup, "PUBLISH_TIMEOUT_MS", 5000)?),
            delivery_mode,
            outbox_poll_interval: Duration::from_millis(parse_in_range(
                &lookup,
                "OUTBOX_POLL_INTERVAL_MS",
                1000,
                1..=u64::MAX,
            )?),
            outbox_batch_size: parse_in_range(
                &lookup,
                "OUTBOX_BATCH_SIZE",
                defaults.outbox_batch_size,
                1..=i64::MAX,
            )?,
            outbox_claim_ttl: Duration::from_secs(parse_in_range(
                &lookup,
                "OUTBOX_CLAIM_TTL_SECS",
                60,
                1..=u64::MAX,
            )?),
            default_seller: lookup("DEFAULT_SELLER").unwrap_or(defaults.default_seller),
            default_auction_days: parse_in_range(
                &lookup,
                "DEFAULT_AUCTION_DAYS",
                defaults.default_auction_days,
                MIN_AUCTION_DAYS..=MAX_AUCTION_DAYS,
            )?,
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?),
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
        })
    }

    /// "host:port" 형식의 바인드 주소
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

/// 범위를 벗어난 값은 Invalid
fn parse_in_range<F, T>(
    lookup: &F,
    key: &'static str,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + ToString,
{
    let value = parse_or(lookup, key, default)?;
    if !range.contains(&value) {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        });
    }
    Ok(value)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_connections: 5,
            kafka_brokers: "localhost:9092".to_string(),
            kafka_topic: "auction-events".to_string(),
            kafka_partitions: 3,
            publish_timeout: Duration::from_millis(5000),
            delivery_mode: DeliveryMode::default(),
            outbox_poll_interval: Duration::from_millis(1000),
            outbox_batch_size: 100,
            outbox_claim_ttl: Duration::from_secs(60),
            default_seller: "test".to_string(),
            default_auction_days: 7,
            request_timeout: Duration::from_secs(30),
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}
// endregion: --- Config

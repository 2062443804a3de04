// region:    --- Imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Auction Error
/// 경매 쓰기/조회 경로에서 발생하는 오류
#[derive(Debug, Error)]
pub enum AuctionError {
    #[error("경매를 찾을 수 없습니다: {0}")]
    NotFound(Uuid),

    #[error("잘못된 요청입니다: {0}")]
    Validation(String),

    /// 커밋 결과 변경된 행이 없음
    #[error("{0}")]
    Persistence(String),

    /// 판매자 본인이 아닌 사용자의 수정/삭제 시도
    #[error("권한이 없습니다: 사용자 {user}, 판매자 {seller}")]
    Forbidden { user: String, seller: String },

    #[error("이벤트 발행 실패: {0}")]
    Publish(#[from] PublishError),

    #[error("데이터베이스 오류: {0}")]
    Database(#[from] sqlx::Error),

    #[error("직렬화 오류: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AuctionError {
    /// 응답 본문에 포함되는 오류 코드
    pub fn code(&self) -> &'static str {
        match self {
            AuctionError::NotFound(_) => "NOT_FOUND",
            AuctionError::Validation(_) => "VALIDATION_FAILED",
            AuctionError::Persistence(_) => "PERSISTENCE_FAILED",
            AuctionError::Forbidden { .. } => "FORBIDDEN",
            AuctionError::Publish(_) => "PUBLISH_FAILED",
            AuctionError::Database(_) => "DATABASE_ERROR",
            AuctionError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuctionError::NotFound(_) => StatusCode::NOT_FOUND,
            AuctionError::Validation(_) | AuctionError::Persistence(_) => StatusCode::BAD_REQUEST,
            AuctionError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AuctionError::Publish(_)
            | AuctionError::Database(_)
            | AuctionError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuctionError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{:<12} --> 요청 처리 실패: {}", "Handler", self);
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        (status, Json(body)).into_response()
    }
}
// endregion: --- Auction Error

// region:    --- Publish Error
/// 메시지 버스 발행 오류
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Kafka 전송 오류: {0}")]
    Kafka(String),

    #[error("이벤트 직렬화 오류: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("발행 거부: {0}")]
    Rejected(String),
}
// endregion: --- Publish Error

// region:    --- Config Error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("환경 변수 {0} 가 설정되지 않았습니다")]
    Missing(&'static str),

    #[error("환경 변수 {key} 의 값이 올바르지 않습니다: {value}")]
    Invalid { key: &'static str, value: String },
}
// endregion: --- Config Error

pub type Result<T> = std::result::Result<T, AuctionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuctionError::NotFound(Uuid::new_v4()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AuctionError::Validation("bad date".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuctionError::Persistence("nothing saved".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuctionError::Forbidden {
                user: "alice".into(),
                seller: "bob".into()
            }
            .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuctionError::Publish(PublishError::Rejected("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body_carries_code() {
        let response = AuctionError::Persistence("Could not save changes to the DB".into())
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "PERSISTENCE_FAILED");
        assert_eq!(json["error"], "Could not save changes to the DB");
    }
}

/// 경매 + 상품 조회 컬럼
const AUCTION_COLUMNS: &str = "a.id, a.reserve_price, a.seller, a.winner, a.sold_amount, a.current_high_bid, a.created_at, a.updated_at, a.auction_end, a.status, i.id AS item_id, i.make, i.model, i.year, i.color, i.mileage, i.image_url";

/// 경매 단건 조회
pub fn get_auction() -> String {
    format!(
        "SELECT {} FROM auctions a JOIN items i ON i.auction_id = a.id WHERE a.id = $1",
        AUCTION_COLUMNS
    )
}

/// 경매 목록 조회 (updated_at 필터는 NULL 이면 무시)
pub fn get_auctions() -> String {
    format!(
        r#"SELECT {} FROM auctions a JOIN items i ON i.auction_id = a.id
        WHERE ($1::timestamptz IS NULL OR a.updated_at > $1)
        ORDER BY i.make COLLATE "C", a.id"#,
        AUCTION_COLUMNS
    )
}

/// 경매 추가
pub const INSERT_AUCTION: &str = r#"
    INSERT INTO auctions (id, reserve_price, seller, winner, sold_amount, current_high_bid, created_at, updated_at, auction_end, status)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
    ON CONFLICT (id) DO NOTHING
"#;

/// 상품 추가
pub const INSERT_ITEM: &str = r#"
    INSERT INTO items (id, auction_id, make, model, year, color, mileage, image_url)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
"#;

/// 경매 수정 시각 갱신
pub const UPDATE_AUCTION: &str = "UPDATE auctions SET updated_at = $2 WHERE id = $1";

/// 상품 수정
pub const UPDATE_ITEM: &str = "UPDATE items SET make = $2, model = $3, color = $4, mileage = $5, year = $6 WHERE auction_id = $1";

/// 경매 삭제 (상품은 cascade)
pub const DELETE_AUCTION: &str = "DELETE FROM auctions WHERE id = $1";

/// outbox 기록
pub const INSERT_OUTBOX: &str = r#"
    INSERT INTO outbox_messages (id, aggregate_id, event_type, data, created_at)
    VALUES ($1, $2, $3, $4, $5)
"#;

/// 미발행 outbox 조회
pub const GET_PENDING_OUTBOX: &str = r#"
    SELECT id, aggregate_id, event_type, data, created_at AS timestamp
    FROM outbox_messages
    WHERE published_at IS NULL
    ORDER BY created_at, id
    LIMIT $1
"#;

/// 미발행, 미선점(또는 선점 만료) outbox 를 선점한다.
/// SKIP LOCKED 로 동시에 실행되는 다른 릴레이가 잡은 행은 건너뛴다.
/// $1 = limit, $2 = 선점 만료 시각, $3 = 현재 시각
pub const CLAIM_PENDING_OUTBOX: &str = r#"
    UPDATE outbox_messages o
    SET claimed_until = $2
    FROM (
        SELECT id FROM outbox_messages
        WHERE published_at IS NULL
          AND (claimed_until IS NULL OR claimed_until < $3)
        ORDER BY created_at, id
        LIMIT $1
        FOR UPDATE SKIP LOCKED
    ) pending
    WHERE o.id = pending.id
    RETURNING o.id, o.aggregate_id, o.event_type, o.data, o.created_at AS timestamp
"#;

/// outbox 선점 해제
pub const RELEASE_OUTBOX: &str =
    "UPDATE outbox_messages SET claimed_until = NULL WHERE id = ANY($1) AND published_at IS NULL";

/// outbox 발행 완료 처리
pub const MARK_OUTBOX_PUBLISHED: &str =
    "UPDATE outbox_messages SET published_at = $2, claimed_until = NULL WHERE id = ANY($1)";

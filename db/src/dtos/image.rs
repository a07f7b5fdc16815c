use chrono::NaiveDateTime;
use sqlx::types::JsonValue;
use uuid::Uuid;

pub struct ImageCreateRequest {
    pub user_id: Uuid,
    pub s3_key: String,
    pub s3_bucket: String,
    pub public_url: String,
    pub url_expires_at: NaiveDateTime,
    pub prompt: String,
    pub attributes: Option<JsonValue>,
    pub filename: String,
    pub file_size: i64,
    pub content_type: String,
}

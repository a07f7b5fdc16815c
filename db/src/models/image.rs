use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::types::JsonValue;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Image {
    pub id: Uuid,
    pub user_id: Uuid,
    pub s3_key: String,
    pub s3_bucket: String,
    /// Presigned GET URL. Refreshed in place when `url_expires_at` passes.
    pub public_url: String,
    pub url_expires_at: NaiveDateTime,
    pub prompt: String,
    pub attributes: Option<JsonValue>,
    pub filename: String,
    pub file_size: i64,
    pub content_type: String,
    pub created_at: NaiveDateTime,
}

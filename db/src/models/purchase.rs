use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct GemPurchase {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Stripe checkout session id. Unique, which makes webhook crediting
    /// idempotent under redelivery.
    pub stripe_session_id: String,
    pub gems: i64,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
}

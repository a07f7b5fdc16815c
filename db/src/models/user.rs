use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub verification_origin: String,
    pub verified: bool,
    pub stripe_customer_id: Option<String>,
    /// Spendable gem balance. Never negative; the debit query enforces it.
    pub tokens_remaining: i64,
    pub tokens_used_total: i64,
    pub tokens_purchased_total: i64,
    pub is_premium: bool,
    pub subscription_status: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct AuthCredentials {
    pub user_id: Uuid,
    pub password_hash: String,
}

/// Ledger snapshot returned by balance reads and mutations.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct TokenBalance {
    pub tokens_remaining: i64,
    pub tokens_used_total: i64,
    pub tokens_purchased_total: i64,
}

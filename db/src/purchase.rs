use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::purchase::PurchaseCreateRequest, models::purchase::GemPurchase};

pub async fn insert_purchase<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: PurchaseCreateRequest,
) -> Res<GemPurchase> {
    sqlx::query_as::<_, GemPurchase>(
        r#"
        INSERT INTO gem_purchases (user_id, stripe_session_id, gems, amount_cents, currency, status)
        VALUES ($1, $2, $3, $4, $5, 'pending')
        RETURNING *
        "#,
    )
    .bind(data.user_id)
    .bind(data.stripe_session_id)
    .bind(data.gems)
    .bind(data.amount_cents)
    .bind(data.currency)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Marks the purchase for a checkout session completed. Returns `None`
/// when the session is unknown or the row was already completed, so a
/// redelivered webhook event credits nothing twice.
pub async fn complete_purchase<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    stripe_session_id: &str,
) -> Res<Option<GemPurchase>> {
    sqlx::query_as::<_, GemPurchase>(
        r#"
        UPDATE gem_purchases
        SET status = 'completed', completed_at = NOW()
        WHERE stripe_session_id = $1 AND status = 'pending'
        RETURNING *
        "#,
    )
    .bind(stripe_session_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

pub async fn list_purchases_by_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Vec<GemPurchase>> {
    sqlx::query_as::<_, GemPurchase>(
        "SELECT * FROM gem_purchases WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

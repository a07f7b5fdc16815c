use common::error::{AppError, Res};
use db::models::user::TokenBalance;
use sqlx::PgPool;
use uuid::Uuid;

/// Current ledger snapshot for the user. 404 when the user row is gone.
pub async fn balance(pool: &PgPool, user_id: Uuid) -> Res<TokenBalance> {
    db::user::get_balance(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Debits gems from the user's balance.
///
/// The conditional update in `db::user::debit_tokens` either succeeds
/// atomically or matches no row; a miss is disambiguated here into
/// 404 (unknown user) or 400 echoing the current and required amounts.
pub async fn debit(pool: &PgPool, user_id: Uuid, amount: i64) -> Res<TokenBalance> {
    if amount <= 0 {
        return Err(AppError::BadRequest(
            "Deduction amount must be positive".to_string(),
        ));
    }

    if let Some(balance) = db::user::debit_tokens(pool, user_id, amount).await? {
        return Ok(balance);
    }

    match db::user::get_balance(pool, user_id).await? {
        Some(balance) => Err(AppError::InsufficientBalance {
            current: balance.tokens_remaining,
            required: amount,
        }),
        None => Err(AppError::NotFound("User not found".to_string())),
    }
}

/// Credits purchased gems. 404 when the user row is gone.
pub async fn credit(pool: &PgPool, user_id: Uuid, amount: i64) -> Res<TokenBalance> {
    if amount <= 0 {
        return Err(AppError::BadRequest(
            "Credit amount must be positive".to_string(),
        ));
    }

    db::user::credit_tokens(pool, user_id, amount)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

use common::{
    error::{AppError, Res},
    misc::UserVerificationOrigin,
};
use sqlx::{Executor, FromRow, Postgres};
use uuid::Uuid;

use crate::{
    dtos::user::{AuthProviderCreateRequest, UserCreateRequest},
    models::user::{AuthCredentials, TokenBalance, User},
};

pub async fn exists_user_by_email<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    email: String,
) -> Res<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_user_by_email<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    email: String,
) -> Res<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn get_user_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(executor)
        .await
        .map_err(AppError::from)
}

pub async fn insert_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: UserCreateRequest,
) -> Res<User> {
    let verified = data.verification_origin == UserVerificationOrigin::OAuth;
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, first_name, last_name, verification_origin, verified, stripe_customer_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(data.email)
    .bind(data.first_name)
    .bind(data.last_name)
    .bind(data.verification_origin.to_string())
    .bind(verified)
    .bind(data.stripe_customer_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

pub async fn insert_user_with_provider<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: AuthProviderCreateRequest,
) -> Res<()> {
    sqlx::query(
        r#"
        INSERT INTO auth_providers (user_id, provider, provider_user_id)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(data.user_id)
    .bind(data.provider)
    .bind(data.provider_user_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn insert_user_with_credentials<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: AuthCredentials,
) -> Res<()> {
    sqlx::query(
        r#"
        INSERT INTO auth_credentials (user_id, password_hash)
        VALUES ($1, $2)
        "#,
    )
    .bind(data.user_id)
    .bind(data.password_hash)
    .execute(executor)
    .await?;
    Ok(())
}

#[derive(FromRow)]
struct UserWithHash {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

pub async fn get_user_with_password_hash<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    email: String,
) -> Res<(User, AuthCredentials)> {
    let record = sqlx::query_as::<_, UserWithHash>(
        r#"
        SELECT u.*, ac.password_hash
        FROM users u
        JOIN auth_credentials ac ON u.id = ac.user_id
        WHERE u.email = $1
        "#,
    )
    .bind(email)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)?;

    let credentials = AuthCredentials {
        user_id: record.user.id,
        password_hash: record.password_hash,
    };
    Ok((record.user, credentials))
}

pub async fn get_balance<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<TokenBalance>> {
    sqlx::query_as::<_, TokenBalance>(
        r#"
        SELECT tokens_remaining, tokens_used_total, tokens_purchased_total
        FROM users WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

/// Debits `amount` gems from the user's balance in a single conditional
/// update. Returns `None` when no row matched, which means either the user
/// does not exist or the balance is insufficient; callers disambiguate.
///
/// The `tokens_remaining >= $2` guard is what keeps concurrent debits from
/// driving the balance negative.
pub async fn debit_tokens<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    amount: i64,
) -> Res<Option<TokenBalance>> {
    sqlx::query_as::<_, TokenBalance>(
        r#"
        UPDATE users
        SET tokens_remaining = tokens_remaining - $2,
            tokens_used_total = tokens_used_total + $2,
            updated_at = NOW()
        WHERE id = $1 AND tokens_remaining >= $2
        RETURNING tokens_remaining, tokens_used_total, tokens_purchased_total
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

/// Credits purchased gems to the user's balance.
pub async fn credit_tokens<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    amount: i64,
) -> Res<Option<TokenBalance>> {
    sqlx::query_as::<_, TokenBalance>(
        r#"
        UPDATE users
        SET tokens_remaining = tokens_remaining + $2,
            tokens_purchased_total = tokens_purchased_total + $2,
            updated_at = NOW()
        WHERE id = $1
        RETURNING tokens_remaining, tokens_used_total, tokens_purchased_total
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}

/// Updates the subscription fields from a Stripe subscription event, keyed
/// by the Stripe customer id the event carries.
pub async fn set_subscription_status<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    stripe_customer_id: &str,
    status: Option<&str>,
    is_premium: bool,
) -> Res<u64> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET subscription_status = $2, is_premium = $3, updated_at = NOW()
        WHERE stripe_customer_id = $1
        "#,
    )
    .bind(stripe_customer_id)
    .bind(status)
    .bind(is_premium)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

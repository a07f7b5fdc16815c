use common::error::{AppError, Res};
use sqlx::PgPool;

use crate::models::log::Log;

pub async fn insert_log(pool: &PgPool, log: Log) -> Res<()> {
    sqlx::query(
        r#"
        INSERT INTO request_logs
            (timestamp, method, path, status_code, user_id, params, ip_address, user_agent, duration_ms)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(log.timestamp)
    .bind(log.method)
    .bind(log.path)
    .bind(log.status_code)
    .bind(log.user_id)
    .bind(log.params)
    .bind(log.ip_address)
    .bind(log.user_agent)
    .bind(log.duration_ms)
    .execute(pool)
    .await
    .map_err(AppError::from)?;
    Ok(())
}

use chrono::NaiveDateTime;
use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::image::ImageCreateRequest, models::image::Image};

pub async fn insert_image<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: ImageCreateRequest,
) -> Res<Image> {
    sqlx::query_as::<_, Image>(
        r#"
        INSERT INTO images
            (user_id, s3_key, s3_bucket, public_url, url_expires_at, prompt,
             attributes, filename, file_size, content_type)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(data.user_id)
    .bind(data.s3_key)
    .bind(data.s3_bucket)
    .bind(data.public_url)
    .bind(data.url_expires_at)
    .bind(data.prompt)
    .bind(data.attributes)
    .bind(data.filename)
    .bind(data.file_size)
    .bind(data.content_type)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// All images owned by the user, newest first.
pub async fn list_images_by_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Vec<Image>> {
    sqlx::query_as::<_, Image>(
        "SELECT * FROM images WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
    .map_err(AppError::from)
}

pub async fn get_image_for_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    image_id: Uuid,
    user_id: Uuid,
) -> Res<Option<Image>> {
    sqlx::query_as::<_, Image>("SELECT * FROM images WHERE id = $1 AND user_id = $2")
        .bind(image_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

/// Swaps in a freshly presigned URL after the stored one expired.
pub async fn refresh_image_url<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    image_id: Uuid,
    public_url: &str,
    url_expires_at: NaiveDateTime,
) -> Res<()> {
    sqlx::query("UPDATE images SET public_url = $2, url_expires_at = $3 WHERE id = $1")
        .bind(image_id)
        .bind(public_url)
        .bind(url_expires_at)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn delete_image<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    image_id: Uuid,
) -> Res<()> {
    sqlx::query("DELETE FROM images WHERE id = $1")
        .bind(image_id)
        .execute(executor)
        .await?;
    Ok(())
}

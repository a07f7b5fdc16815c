use base64::{Engine, engine::general_purpose};
use chrono::NaiveDateTime;
use common::error::{AppError, GenerationErrorCode, Res};
use db::{dtos::image::ImageCreateRequest, models::image::Image};
use genai::GenAiClient;
use sqlx::PgPool;
use storage::ObjectStore;
use uuid::Uuid;

use crate::dtos::images::SaveImageRequest;

/// Upper bound on prompt length, matching the provider's own limit.
pub const MAX_PROMPT_CHARS: usize = 2000;

/// URLs within this margin of expiry are refreshed during reads, so a
/// client never receives a URL that dies mid-render.
const EXPIRY_MARGIN_SECS: i64 = 300;

/// Rejects empty and oversized prompts before any gems are spent.
pub fn validate_prompt(prompt: &str) -> Res<()> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(AppError::Generation {
            code: GenerationErrorCode::InvalidPrompt,
            message: "Prompt must not be empty".to_string(),
        });
    }
    if trimmed.chars().count() > MAX_PROMPT_CHARS {
        return Err(AppError::Generation {
            code: GenerationErrorCode::InvalidPrompt,
            message: format!("Prompt must be at most {} characters", MAX_PROMPT_CHARS),
        });
    }
    Ok(())
}

/// Whether a stored presigned URL needs re-presigning at read time.
pub fn needs_refresh(url_expires_at: NaiveDateTime, now: NaiveDateTime) -> bool {
    url_expires_at <= now + chrono::Duration::seconds(EXPIRY_MARGIN_SECS)
}

pub fn extension_for_content_type(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "bin",
    }
}

/// Persists a generated image: obtains the bytes (provider download or
/// inline base64), uploads them to the object store, presigns a GET URL
/// and inserts the database row.
pub async fn save_image(
    pool: &PgPool,
    store: &ObjectStore,
    genai: &GenAiClient,
    user_id: Uuid,
    req: SaveImageRequest,
) -> Res<Image> {
    validate_prompt(&req.prompt)?;

    let bytes = match (&req.url, &req.b64_json) {
        (Some(url), None) => genai.fetch_image_bytes(url).await?,
        (None, Some(b64)) => general_purpose::STANDARD
            .decode(b64)
            .map_err(|e| AppError::BadRequest(format!("Invalid base64 image data: {}", e)))?,
        _ => {
            return Err(AppError::BadRequest(
                "Exactly one of url or b64_json must be provided".to_string(),
            ));
        }
    };

    if bytes.is_empty() {
        return Err(AppError::BadRequest("Image data is empty".to_string()));
    }

    let content_type = req
        .content_type
        .unwrap_or_else(|| "image/png".to_string());
    let key = ObjectStore::object_key(user_id, extension_for_content_type(&content_type));
    let file_size = bytes.len() as i64;

    store.put_object(&key, bytes, &content_type).await?;
    let (public_url, url_expires_at) = store.presign_get(&key).await?;

    let filename = req.filename.unwrap_or_else(|| {
        key.rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    });

    db::image::insert_image(
        pool,
        ImageCreateRequest {
            user_id,
            s3_key: key,
            s3_bucket: store.bucket().to_string(),
            public_url,
            url_expires_at,
            prompt: req.prompt,
            attributes: req.attributes,
            filename,
            file_size,
            content_type,
        },
    )
    .await
}

/// Lists the user's images. Rows whose presigned URL has expired (or is
/// about to) get a fresh URL written back before the list is returned;
/// expiry never deletes anything.
pub async fn list_with_fresh_urls(
    pool: &PgPool,
    store: &ObjectStore,
    user_id: Uuid,
) -> Res<Vec<Image>> {
    let mut images = db::image::list_images_by_user(pool, user_id).await?;
    let now = chrono::Utc::now().naive_utc();

    for image in images.iter_mut() {
        if !needs_refresh(image.url_expires_at, now) {
            continue;
        }
        let (public_url, url_expires_at) = store.presign_get(&image.s3_key).await?;
        db::image::refresh_image_url(pool, image.id, &public_url, url_expires_at).await?;
        image.public_url = public_url;
        image.url_expires_at = url_expires_at;
    }

    Ok(images)
}

/// Deletes the stored object and the row. 404 when the image does not
/// exist or belongs to another user.
pub async fn delete_image(
    pool: &PgPool,
    store: &ObjectStore,
    user_id: Uuid,
    image_id: Uuid,
) -> Res<()> {
    let image = db::image::get_image_for_user(pool, image_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;

    store.delete_object(&image.s3_key).await?;
    db::image::delete_image(pool, image.id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prompt_is_rejected() {
        assert!(matches!(
            validate_prompt("   "),
            Err(AppError::Generation {
                code: GenerationErrorCode::InvalidPrompt,
                ..
            })
        ));
    }

    #[test]
    fn oversized_prompt_is_rejected() {
        let prompt = "x".repeat(MAX_PROMPT_CHARS + 1);
        assert!(validate_prompt(&prompt).is_err());
    }

    #[test]
    fn boundary_prompt_is_accepted() {
        let prompt = "x".repeat(MAX_PROMPT_CHARS);
        assert!(validate_prompt(&prompt).is_ok());
    }

    #[test]
    fn refresh_triggers_at_and_after_expiry() {
        let now = chrono::Utc::now().naive_utc();
        assert!(needs_refresh(now, now));
        assert!(needs_refresh(now - chrono::Duration::days(1), now));
        // inside the safety margin
        assert!(needs_refresh(now + chrono::Duration::seconds(60), now));
        // comfortably in the future
        assert!(!needs_refresh(now + chrono::Duration::days(6), now));
    }

    #[test]
    fn extensions_follow_content_type() {
        assert_eq!(extension_for_content_type("image/png"), "png");
        assert_eq!(extension_for_content_type("image/jpeg"), "jpg");
        assert_eq!(extension_for_content_type("application/pdf"), "bin");
    }
}

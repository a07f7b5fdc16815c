use std::sync::Arc;

use actix_web::{Responder, delete, get, post, web};
use api_gems::services::ledger;
use common::{env_config::Config, error::Res, http::Success, jwt::JwtClaims};
use genai::GenAiClient;
use sqlx::PgPool;
use storage::ObjectStore;
use uuid::Uuid;

use crate::{
    dtos::images::{GenerateImageRequest, GenerateImageResponse, ImagesResponse, SaveImageRequest},
    services,
};

/// Generates an image from a prompt.
///
/// Validates the prompt, debits the configured gem cost, then calls the
/// generation provider. Provider failures surface with the fixed error
/// taxonomy (`code` + `retryable`); gems debited for a failed generation
/// are not refunded, matching the billing model of the rest of the app.
///
/// # Input
/// - `req`: JSON payload with `prompt` and optional `size` / `model`
///
/// # Output
/// - Success: the provider result plus the remaining gem balance
/// - Error: 400 for an invalid prompt or insufficient balance, 429/502 for
///   provider-side failures
#[post("/generate")]
pub async fn post_generate(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<GenerateImageRequest>,
    pool: web::Data<Arc<PgPool>>,
    genai: web::Data<GenAiClient>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let req = req.into_inner();
    services::images::validate_prompt(&req.prompt)?;

    let balance = ledger::debit(&pool, claims.user_id, config.gem_costs.image_generation).await?;

    let model = req.model.as_deref().unwrap_or(genai::DEFAULT_IMAGE_MODEL);
    let size = req.size.as_deref().unwrap_or(genai::DEFAULT_IMAGE_SIZE);
    let image = genai.generate_image(req.prompt.trim(), model, size).await?;

    log::info!(
        "Generated image for user {} ({} gems remaining)",
        claims.user_id,
        balance.tokens_remaining
    );

    Success::ok(GenerateImageResponse {
        image,
        gems_remaining: balance.tokens_remaining,
    })
}

/// Persists a generated image: downloads it from the provider URL (or
/// decodes inline base64), uploads to the object store and inserts the
/// row with a 7-day presigned URL.
#[post("/save")]
pub async fn post_save(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<SaveImageRequest>,
    pool: web::Data<Arc<PgPool>>,
    store: web::Data<ObjectStore>,
    genai: web::Data<GenAiClient>,
) -> Res<impl Responder> {
    let image =
        services::images::save_image(&pool, &store, &genai, claims.user_id, req.into_inner())
            .await?;
    Success::created(image)
}

/// Lists the authenticated user's images, newest first. Expired presigned
/// URLs are refreshed in place as part of the read.
#[get("")]
pub async fn get_images(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
    store: web::Data<ObjectStore>,
) -> Res<impl Responder> {
    let images = services::images::list_with_fresh_urls(&pool, &store, claims.user_id).await?;
    Success::ok(ImagesResponse { images })
}

/// Deletes one of the user's images, object and row both.
#[delete("/{image_id}")]
pub async fn delete_image(
    claims: web::ReqData<JwtClaims>,
    path: web::Path<Uuid>,
    pool: web::Data<Arc<PgPool>>,
    store: web::Data<ObjectStore>,
) -> Res<impl Responder> {
    services::images::delete_image(&pool, &store, claims.user_id, path.into_inner()).await?;
    Success::no_content()
}

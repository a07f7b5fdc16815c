use std::sync::Arc;

use actix_web::{Responder, post, web};
use common::{
    env_config::Config,
    error::{AppError, Res},
    http::Success,
};
use sqlx::PgPool;

use crate::services;

/// Handles Stripe webhook events.
///
/// # Input
/// - `payload`: Raw string containing the webhook event data
/// - `req`: HTTP request containing the `stripe-signature` header
/// - `config`: Application configuration with the webhook secret
///
/// # Output
/// - Success: 200 OK once the event is processed
/// - Error: 400 for a missing/invalid signature, 500 for processing errors
///
/// # Note
/// This endpoint is called by Stripe's servers, not by the frontend.
/// Configure it in the Stripe Dashboard under Webhooks and subscribe to
/// `checkout.session.completed` plus the `customer.subscription.*` events;
/// set the signing secret as STRIPE_WEBHOOK_SECRET.
#[post("/webhook")]
pub async fn post_webhook(
    payload: String,
    req: actix_web::HttpRequest,
    pool: web::Data<Arc<PgPool>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let signature = match req.headers().get("stripe-signature") {
        Some(signature) => signature.to_str().unwrap_or(""),
        None => return Err(AppError::BadRequest("Stripe signature missing".to_string())),
    };

    let event = services::pay::construct_event(&payload, signature, &config.stripe_webhook_secret)?;
    services::pay::process_webhook_event(&pool, event).await?;

    Success::ok("Webhook processed successfully")
}

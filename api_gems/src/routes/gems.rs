use std::sync::Arc;

use actix_web::{Responder, get, post, web};
use common::{
    env_config::Config,
    error::{AppError, Res},
    http::Success,
    jwt::JwtClaims,
    stripe,
};
use sqlx::PgPool;

use crate::{
    dtos::gems::{DeductRequest, GemPacksResponse, PurchaseGemsRequest, PurchaseGemsResponse},
    models::pack::GemPack,
    services,
};

/// Returns the authenticated user's gem balance and lifetime counters.
#[get("/balance")]
pub async fn get_balance(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let balance = services::ledger::balance(&pool, claims.user_id).await?;
    Success::ok(balance)
}

/// Lists the gem packs on offer (cached from Stripe at startup).
#[get("/packs")]
pub async fn get_packs(packs: web::Data<Vec<GemPack>>) -> Res<impl Responder> {
    Success::ok(GemPacksResponse {
        packs: packs.get_ref().clone(),
    })
}

/// The authenticated user's purchase history, newest first.
#[get("/purchases")]
pub async fn get_purchases(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let purchases = db::purchase::list_purchases_by_user(&***pool, claims.user_id).await?;
    Success::ok(purchases)
}

/// Explicitly deducts gems from the authenticated user's balance.
///
/// # Input
/// - `req`: JSON payload with `amount` (positive) and an optional `reason`
///
/// # Output
/// - Success: the updated ledger snapshot
/// - Error: 400 echoing current/required amounts when the balance is
///   insufficient, 404 when the user row is missing
#[post("/deduct")]
pub async fn post_deduct(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<DeductRequest>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let balance = services::ledger::debit(&pool, claims.user_id, req.amount).await?;
    if let Some(reason) = &req.reason {
        log::info!(
            "Deducted {} gems from user {} ({})",
            req.amount,
            claims.user_id,
            reason
        );
    }
    Success::ok(balance)
}

/// Creates a Stripe checkout session for a gem pack and records the
/// pending purchase. Gems are credited by the webhook once Stripe reports
/// the session completed, never here.
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/dashboard/gems/purchase', {
///   method: 'POST',
///   headers: {
///     'Content-Type': 'application/json',
///     'Authorization': `Bearer ${localStorage.getItem('authToken')}`
///   },
///   body: JSON.stringify({
///     pack_id: "price_1234567890", // from the packs endpoint
///     success_url: "https://yourapp.com/gems/success",
///     cancel_url: "https://yourapp.com/gems/canceled"
///   })
/// });
///
/// if (response.ok) {
///   const data = await response.json();
///   window.location.href = data.url; // Stripe Checkout
/// }
/// ```
#[post("/purchase")]
pub async fn post_purchase(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<PurchaseGemsRequest>,
    pool: web::Data<Arc<PgPool>>,
    packs: web::Data<Vec<GemPack>>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let pack = packs
        .iter()
        .find(|pack| pack.id == req.pack_id)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown gem pack: {}", req.pack_id)))?
        .clone();

    let client = stripe::create_client(&config.stripe_secret_key);
    let customer = services::pay::get_customer(&client, &claims.stripe_customer_id).await?;

    let session = services::pay::create_gem_checkout_session(
        &client,
        &customer,
        claims.user_id,
        &pack,
        &req.success_url,
        &req.cancel_url,
    )
    .await?;

    db::purchase::insert_purchase(
        &***pool,
        db::dtos::purchase::PurchaseCreateRequest {
            user_id: claims.user_id,
            stripe_session_id: session.id.to_string(),
            gems: pack.gems,
            amount_cents: session.amount_total.unwrap_or(pack.price),
            currency: pack.currency.clone(),
        },
    )
    .await?;

    Success::created(PurchaseGemsResponse {
        url: session.url.unwrap_or_default(),
    })
}

use std::sync::Arc;

use actix_web::{Responder, get, web};
use common::{http::Success, jwt::JwtClaims};
use sqlx::PgPool;

use crate::services;

/// Returns the authenticated user's profile, including the gem counters.
///
/// # Output
/// - Success: the user row as JSON
/// - Error: 401 without a valid token, 404 if the user row is gone
#[get("/me")]
pub async fn get_me(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> impl Responder {
    let user_id = claims.user_id;
    let pg_pool: &PgPool = &pool;
    let user = services::user::get_user_by_id(pg_pool, user_id).await?;
    Success::ok(user)
}

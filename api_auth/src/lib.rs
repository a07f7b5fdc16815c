use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use actix_web::web;

use middleware::auth::AuthMiddleware;

pub mod middleware {
    pub mod auth;
}

pub mod routes {
    pub mod auth;
    pub mod session;
    pub mod user;
}

mod services {
    pub(crate) mod auth;
    pub(crate) mod user;
}

mod dtos {
    pub(crate) mod auth;
}

mod misc {
    pub(crate) mod oauth;
}

pub fn mount_auth() -> actix_web::Scope {
    web::scope("/auth")
        .service(routes::auth::post_register)
        .service(routes::auth::post_login)
        .service(routes::auth::get_auth_provider)
        .service(routes::auth::get_auth_provider_callback)
}

pub fn mount_session() -> actix_web::Scope {
    web::scope("/session").service(routes::session::get_session)
}

pub fn mount_user() -> actix_web::Scope {
    web::scope("/user").service(routes::user::get_me)
}

/// Guards a scope: rejects with 401 unless the extractor stored valid JWT
/// claims on the request.
pub fn auth_middleware() -> AuthMiddleware {
    AuthMiddleware::new()
}

/// Cookie sessions used to hand the OAuth result back to the web app.
pub fn session_middleware(
    cookie_secure: bool,
    is_production: bool,
    secret: &[u8],
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::derive_from(secret))
        .cookie_secure(cookie_secure)
        .cookie_same_site(if is_production {
            SameSite::None
        } else {
            SameSite::Lax
        })
        .build()
}

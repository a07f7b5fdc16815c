mod cors;

use actix_web::{
    App, HttpServer,
    web::{self},
};
use common::env_config::Config;
use storage::ObjectStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();
    let config_data = config.clone();

    // get info
    let is_production = config.environment == "production";
    let origin = config.cors_allowed_origin.clone();
    let cookie_secure = !origin.contains("localhost");

    // init logger
    if config.console_logging_enabled {
        logger::setup().expect("Failed to set up logger");
    }

    // init db connection
    let pool = db::setup(&config.database_url, is_production)
        .await
        .expect("Failed to set up database");

    // fetch the gem packs on offer from Stripe
    let gem_packs = if config.stripe_secret_key.is_empty() {
        log::warn!("STRIPE_SECRET_KEY not set; no gem packs will be on offer");
        Vec::new()
    } else {
        let client = common::stripe::create_client(&config.stripe_secret_key);
        api_gems::get_gem_packs(&client)
            .await
            .expect("Failed to fetch gem packs from Stripe API")
    };
    log::info!("Offering {} gem packs", gem_packs.len());

    // init object storage and the generation client
    let store = ObjectStore::connect(&config.s3).await;
    let genai_client = genai::GenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_api_base.clone(),
    );

    // per-IP limiter state is shared across workers; built once out here
    let ip_limiter = limiter::ip_limiter(&config.rate_limit);
    let global_permits = config.rate_limit.global_per_second;

    HttpServer::new(move || {
        let secret = config_data.jwt_config.secret.as_bytes();
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_data.clone()))
            .app_data(web::Data::new(gem_packs.clone()))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(genai_client.clone()))
            .wrap(limiter::global_middleware(global_permits))
            .wrap(logger::middleware()) // 4th
            .wrap(extractor::middleware()) // 3rd
            .wrap(cors::middleware(&origin)) // 2nd
            .wrap(api_auth::session_middleware(
                cookie_secure,
                is_production,
                secret,
            )) // 1st
            .service(
                web::scope("/api")
                    .service(api_auth::mount_auth())
                    .service(api_auth::mount_session())
                    .service(api_gems::mount_webhook())
                    .service(
                        web::scope("/dashboard")
                            .wrap(api_auth::auth_middleware())
                            .wrap(limiter::ip_middleware(ip_limiter.clone()))
                            .service(api_auth::mount_user())
                            .service(api_gems::mount_gems())
                            .service(api_images::mount_images())
                            .service(api_tailor::mount_tailor()),
                    ),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}

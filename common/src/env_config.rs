use std::{env, sync::Arc};

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// Holds everything needed to initialize and run the service: database
/// connection details, JWT configuration, server host and port, CORS
/// settings, logging preferences, OAuth provider clients, Stripe keys,
/// the image-generation API key, object storage settings, rate limits
/// and gem costs.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// The URL of the database to connect to.
    pub database_url: String,
    /// Configuration for JWT (JSON Web Token) authentication.
    pub jwt_config: JwtConfig,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The allowed origin for CORS (Cross-Origin Resource Sharing).
    pub cors_allowed_origin: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// The URL that the web application will redirect to after authentication.
    pub web_app_auth_callback_url: String,
    /// Configuration for the GitHub OAuth2 client.
    pub github_client: OAuthProviderClient,
    /// Configuration for the Google OAuth2 client.
    pub google_client: OAuthProviderClient,
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Stripe webhook secret
    pub stripe_webhook_secret: String,
    /// API key for the image-generation / chat-completions provider.
    pub openai_api_key: String,
    /// Base URL of the provider API (override for self-hosted gateways).
    pub openai_api_base: String,
    /// Object storage settings (S3 or S3-compatible).
    pub s3: S3Settings,
    /// Rate limiting settings.
    pub rate_limit: RateLimitSettings,
    /// Gem costs per paid action.
    pub gem_costs: GemCosts,
}

#[derive(Clone, Debug)]
/// `OAuthProviderClient` holds the configuration necessary for interacting
/// with an OAuth 2.0 provider: client ID and secret, the authentication and
/// token URLs, and the redirect URI used after successful authentication.
pub struct OAuthProviderClient {
    /// The client ID for the OAuth 2.0 provider.
    pub client_id: String,
    /// The client secret for the OAuth 2.0 provider.
    pub client_secret: String,
    /// The authentication URL for the OAuth 2.0 provider.
    pub auth_url: String,
    /// The token URL for the OAuth 2.0 provider.
    pub token_url: String,
    /// The redirect URI for the OAuth 2.0 provider.
    pub redirect_uri: String,
}

#[derive(Clone, Debug)]
/// Configuration for JSON Web Token (JWT) authentication: the secret used
/// to sign tokens and their expiration time in hours.
pub struct JwtConfig {
    /// The secret key used to sign and verify JWTs.
    pub secret: String,
    /// The expiration time for JWTs in hours.
    pub expiration_hours: i64,
}

#[derive(Clone, Debug)]
/// Connection and presigning settings for the S3-compatible object store
/// that holds generated images.
pub struct S3Settings {
    /// Endpoint URL (AWS or any S3-compatible provider).
    pub endpoint: String,
    pub region: String,
    /// Bucket that stores generated images.
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    /// Path-style addressing, required by most non-AWS providers.
    pub force_path_style: bool,
    /// Lifetime of presigned GET URLs in seconds. Default: 7 days.
    pub presign_ttl_secs: u64,
}

#[derive(Clone, Debug)]
pub struct RateLimitSettings {
    /// Process-wide request ceiling, permits per second.
    pub global_per_second: u32,
    /// Per-IP request ceiling on paid-action endpoints within `ip_window_secs`.
    pub ip_max_requests: u32,
    pub ip_window_secs: u64,
    /// Interval between sweeps of idle per-IP limiter state.
    pub sweep_interval_secs: u64,
}

#[derive(Clone, Debug)]
pub struct GemCosts {
    /// Gems debited per generated image.
    pub image_generation: i64,
    /// Gems debited per gap analysis.
    pub gap_analysis: i64,
}

impl JwtConfig {
    /// Creates a new `JwtConfig` instance from environment variables.
    ///
    /// - `JWT_SECRET`: Required. The secret key for JWT signing.
    /// - `JWT_EXPIRATION_HOURS`: Optional. Defaults to 24 hours.
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or `JWT_EXPIRATION_HOURS` is not a
    /// valid number.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        JwtConfig {
            secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .expect("JWT_EXPIRATION_HOURS must be a valid number"),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// Required: `ENVIRONMENT`, `DATABASE_URL`, `JWT_SECRET`, `S3_BUCKET`.
    /// Everything else has a development default; Stripe and provider keys
    /// default to empty strings so the server can boot without billing or
    /// generation configured (those endpoints then fail upstream).
    ///
    /// # Panics
    ///
    /// Panics if required environment variables are missing or numeric
    /// values cannot be parsed.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        Arc::new(Config {
            environment: env::var("ENVIRONMENT").expect("ENVIRONMENT must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_config: JwtConfig::from_env(),
            server_host: env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env_parse("PORT", 8080),
            num_workers: env_parse("WORKERS", 4),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            console_logging_enabled: env::var("ENABLE_CONSOLE_LOGGING")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                == "true",
            web_app_auth_callback_url: env::var("WEB_APP_AUTH_CALLBACK_URL")
                .unwrap_or_else(|_| "http://localhost:3000/auth/callback".to_string()),
            github_client: OAuthProviderClient {
                client_id: env::var("GITHUB_CLIENT_ID").unwrap_or_default(),
                client_secret: env::var("GITHUB_CLIENT_SECRET").unwrap_or_default(),
                auth_url: env::var("GITHUB_AUTH_URL")
                    .unwrap_or_else(|_| "https://github.com/login/oauth/authorize".to_string()),
                token_url: env::var("GITHUB_TOKEN_URL")
                    .unwrap_or_else(|_| "https://github.com/login/oauth/access_token".to_string()),
                redirect_uri: env::var("GITHUB_REDIRECT_URI").unwrap_or_else(|_| {
                    "http://localhost:8080/api/auth/oauth/github/callback".to_string()
                }),
            },
            google_client: OAuthProviderClient {
                client_id: env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
                client_secret: env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
                auth_url: env::var("GOOGLE_AUTH_URL")
                    .unwrap_or_else(|_| "https://accounts.google.com/o/oauth2/v2/auth".to_string()),
                token_url: env::var("GOOGLE_TOKEN_URL")
                    .unwrap_or_else(|_| "https://www.googleapis.com/oauth2/v4/token".to_string()),
                redirect_uri: env::var("GOOGLE_REDIRECT_URI").unwrap_or_else(|_| {
                    "http://localhost:8080/api/auth/oauth/google/callback".to_string()
                }),
            },
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            stripe_webhook_secret: env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_api_base: env::var("OPENAI_API_BASE")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            s3: S3Settings {
                endpoint: env::var("S3_ENDPOINT")
                    .unwrap_or_else(|_| "https://s3.amazonaws.com".to_string()),
                region: env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                bucket: env::var("S3_BUCKET").expect("S3_BUCKET must be set"),
                access_key: env::var("S3_ACCESS_KEY").unwrap_or_default(),
                secret_key: env::var("S3_SECRET_KEY").unwrap_or_default(),
                force_path_style: env::var("S3_FORCE_PATH_STYLE")
                    .unwrap_or_else(|_| "true".to_string())
                    .to_lowercase()
                    == "true",
                presign_ttl_secs: env_parse("S3_PRESIGN_TTL_SECS", 7 * 24 * 60 * 60),
            },
            rate_limit: RateLimitSettings {
                global_per_second: env_parse("RATE_LIMIT_GLOBAL_PER_SECOND", 10),
                ip_max_requests: env_parse("RATE_LIMIT_IP_MAX_REQUESTS", 20),
                ip_window_secs: env_parse("RATE_LIMIT_IP_WINDOW_SECS", 60),
                sweep_interval_secs: env_parse("RATE_LIMIT_SWEEP_INTERVAL_SECS", 300),
            },
            gem_costs: GemCosts {
                image_generation: env_parse("GEM_COST_IMAGE_GENERATION", 1),
                gap_analysis: env_parse("GEM_COST_GAP_ANALYSIS", 1),
            },
        })
    }
}

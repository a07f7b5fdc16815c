use actix_web::HttpResponse;
use thiserror::Error;

pub type Res<T> = std::result::Result<T, AppError>;

/// Fixed taxonomy for upstream generation failures, surfaced to clients as
/// a string tag plus a `retryable` boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorCode {
    InvalidPrompt,
    RateLimit,
    QuotaExceeded,
    ContentPolicy,
    NetworkError,
    Unknown,
}

impl GenerationErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationErrorCode::InvalidPrompt => "invalid_prompt",
            GenerationErrorCode::RateLimit => "rate_limit",
            GenerationErrorCode::QuotaExceeded => "quota_exceeded",
            GenerationErrorCode::ContentPolicy => "content_policy",
            GenerationErrorCode::NetworkError => "network_error",
            GenerationErrorCode::Unknown => "unknown",
        }
    }

    /// Whether the client is expected to succeed by simply retrying.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            GenerationErrorCode::RateLimit | GenerationErrorCode::NetworkError
        )
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    // === CONVERSION ERRORS ===
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JWT error: {0}")]
    JWT(#[from] jsonwebtoken::errors::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Stripe error: {0}")]
    Stripe(#[from] stripe::StripeError),

    // === APPLICATION ERRORS ===
    #[error("Authorization error: {0}")]
    Unauthorized(String),

    #[error("Resource conflict: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Too Many Requests: {0}")]
    TooManyRequests(String),

    #[error("Insufficient gem balance: {current} available, {required} required")]
    InsufficientBalance { current: i64, required: i64 },

    #[error("Generation failed ({}): {message}", code.as_str())]
    Generation {
        code: GenerationErrorCode,
        message: String,
    },

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn to_http_response(&self) -> HttpResponse {
        let is_dev = cfg!(debug_assertions);

        let to_internal_json = |err_msg: &str| {
            if is_dev {
                serde_json::json!({ "error": err_msg })
            } else {
                serde_json::json!({ "error": "Internal server error" })
            }
        };

        match self {
            // === CONVERSION ERRORS ===
            AppError::Database(error) => {
                log::error!("Database error: {}", error);
                HttpResponse::InternalServerError().json(to_internal_json(&error.to_string()))
            }
            AppError::JWT(error) => {
                log::error!("JWT error: {}", error);
                HttpResponse::InternalServerError().json(to_internal_json(&error.to_string()))
            }
            AppError::Reqwest(error) => {
                log::error!("Reqwest error: {}", error);
                HttpResponse::InternalServerError().json(to_internal_json(&error.to_string()))
            }
            AppError::Stripe(error) => {
                log::error!("Stripe error: {}", error);
                HttpResponse::InternalServerError().json(to_internal_json(&error.to_string()))
            }

            // === APPLICATION ERRORS ===
            AppError::Unauthorized(_) => {
                HttpResponse::Unauthorized().json(serde_json::json!({ "error": self.to_string() }))
            }
            AppError::Forbidden(_) => {
                HttpResponse::Forbidden().json(serde_json::json!({ "error": self.to_string() }))
            }
            AppError::NotFound(_) => {
                HttpResponse::NotFound().json(serde_json::json!({ "error": self.to_string() }))
            }
            AppError::BadRequest(_) => {
                HttpResponse::BadRequest().json(serde_json::json!({ "error": self.to_string() }))
            }
            AppError::TooManyRequests(_) => HttpResponse::TooManyRequests()
                .json(serde_json::json!({ "error": self.to_string() })),

            AppError::InsufficientBalance { current, required } => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "Insufficient gem balance",
                    "current": current,
                    "required": required,
                }))
            }

            AppError::Generation { code, message } => {
                let body = serde_json::json!({
                    "error": message,
                    "code": code.as_str(),
                    "retryable": code.retryable(),
                });
                match code {
                    GenerationErrorCode::InvalidPrompt | GenerationErrorCode::ContentPolicy => {
                        HttpResponse::BadRequest().json(body)
                    }
                    GenerationErrorCode::RateLimit | GenerationErrorCode::QuotaExceeded => {
                        HttpResponse::TooManyRequests().json(body)
                    }
                    GenerationErrorCode::NetworkError | GenerationErrorCode::Unknown => {
                        log::error!("Upstream generation error: {}", message);
                        HttpResponse::BadGateway().json(body)
                    }
                }
            }

            AppError::Internal(error) => {
                log::error!("Internal error: {}", error);
                HttpResponse::InternalServerError().json(to_internal_json(&error.to_string()))
            }
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        self.to_http_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_tags_are_stable() {
        assert_eq!(GenerationErrorCode::InvalidPrompt.as_str(), "invalid_prompt");
        assert_eq!(GenerationErrorCode::RateLimit.as_str(), "rate_limit");
        assert_eq!(GenerationErrorCode::QuotaExceeded.as_str(), "quota_exceeded");
        assert_eq!(GenerationErrorCode::ContentPolicy.as_str(), "content_policy");
        assert_eq!(GenerationErrorCode::NetworkError.as_str(), "network_error");
        assert_eq!(GenerationErrorCode::Unknown.as_str(), "unknown");
    }

    #[test]
    fn only_transient_codes_are_retryable() {
        assert!(GenerationErrorCode::RateLimit.retryable());
        assert!(GenerationErrorCode::NetworkError.retryable());
        assert!(!GenerationErrorCode::InvalidPrompt.retryable());
        assert!(!GenerationErrorCode::QuotaExceeded.retryable());
        assert!(!GenerationErrorCode::ContentPolicy.retryable());
        assert!(!GenerationErrorCode::Unknown.retryable());
    }

    #[test]
    fn insufficient_balance_maps_to_bad_request() {
        let err = AppError::InsufficientBalance {
            current: 2,
            required: 5,
        };
        let res = err.to_http_response();
        assert_eq!(res.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rate_limited_generation_maps_to_too_many_requests() {
        let err = AppError::Generation {
            code: GenerationErrorCode::RateLimit,
            message: "slow down".to_string(),
        };
        let res = err.to_http_response();
        assert_eq!(
            res.status(),
            actix_web::http::StatusCode::TOO_MANY_REQUESTS
        );
    }
}

use actix_web::web;
use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use chrono::Utc;
use colored::Colorize;
use common::env_config::Config;
use common::jwt::get_jwt_claims_or_error;
use db::models::log::Log;
use futures::future::{LocalBoxFuture, Ready, ready};
use log::info;
use serde_json::json;
use sqlx::PgPool;
use sqlx::types::ipnetwork::IpNetwork;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Request logger: colored console line per request plus an audit row in
/// `request_logs`. Bodies are not captured; the webhook payload in
/// particular must stay out of the log table.
pub struct LoggerMiddleware {}

impl LoggerMiddleware {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for LoggerMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = LoggerMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggerMiddlewareService {
            service: Arc::new(service),
        }))
    }
}

pub struct LoggerMiddlewareService<S> {
    service: Arc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let query_string = req.query_string().to_string();

        let ip_str = req
            .connection_info()
            .realip_remote_addr()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        let ip_address =
            IpNetwork::from_str(&ip_str).unwrap_or_else(|_| IpNetwork::from_str("0.0.0.0").unwrap());

        let user_agent = req
            .headers()
            .get("User-Agent")
            .map(|ua| ua.to_str().unwrap_or_default().to_string())
            .unwrap_or_default();

        let config = req.app_data::<web::Data<Arc<Config>>>().unwrap();
        let console_logging_enabled = config.console_logging_enabled;
        let srv = Arc::clone(&self.service);

        Box::pin(async move {
            let user_id: Option<Uuid> = get_jwt_claims_or_error(&req).ok().map(|c| c.user_id);
            let pool = Arc::clone(req.app_data::<web::Data<Arc<PgPool>>>().unwrap());

            let res = srv.call(req).await?;

            let status_code = res.status().as_u16() as i32;
            let duration_ms = started.elapsed().as_millis() as i64;
            let timestamp = Utc::now();

            let params_json = if !query_string.is_empty() {
                let mut params_map = HashMap::new();
                for pair in query_string.split('&') {
                    if let Some(pos) = pair.find('=') {
                        params_map.insert(pair[0..pos].to_string(), json!(&pair[pos + 1..]));
                    } else {
                        params_map.insert(pair.to_string(), json!(true));
                    }
                }
                Some(json!(params_map))
            } else {
                None
            };

            if console_logging_enabled {
                let colored_status = match status_code {
                    200..=299 => status_code.to_string().green(),
                    300..=399 => status_code.to_string().yellow(),
                    400..=499 => status_code.to_string().bright_red(),
                    _ => status_code.to_string().red(),
                };

                let colored_method = match method.as_str() {
                    "GET" => method.blue(),
                    "POST" => method.yellow(),
                    "PUT" => method.purple(),
                    "DELETE" => method.red(),
                    _ => method.normal(),
                };

                info!(
                    "[{}] {} {} {} user_id={}",
                    colored_status,
                    colored_method,
                    path.bright_white(),
                    format!("({}ms)", duration_ms).bright_black(),
                    user_id
                        .map_or("None".to_string(), |id| id.to_string())
                        .bright_blue(),
                );
            }

            let log_row = Log {
                id: Uuid::nil(), // auto-generated
                timestamp: timestamp.naive_utc(),
                method,
                path,
                status_code,
                user_id,
                params: params_json,
                ip_address,
                user_agent,
                duration_ms,
            };
            if let Err(e) = db::log::insert_log(&pool, log_row).await {
                log::error!("Failed to persist request log: {}", e);
            }

            Ok(res)
        })
    }
}

use std::{
    future::Future,
    net::IpAddr,
    num::NonZeroU32,
    pin::Pin,
    rc::Rc,
    str::FromStr,
    sync::Arc,
    time::Duration,
};

use actix_web::{
    Error, HttpResponse,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header,
};
use common::env_config::RateLimitSettings;
use governor::{
    Quota, RateLimiter,
    clock::{Clock, QuantaClock},
    state::keyed::DashMapStateStore,
};

type IpStateStore = DashMapStateStore<IpAddr>;

/// Shared per-IP limiter state: `max_requests` per `window` per client IP.
/// A background task sweeps idle entries so the map stays bounded.
#[derive(Clone)]
pub struct IpLimiter {
    limiter: Arc<RateLimiter<IpAddr, IpStateStore, QuantaClock>>,
    clock: QuantaClock,
}

impl IpLimiter {
    pub fn new(settings: &RateLimitSettings) -> Self {
        let max_requests =
            NonZeroU32::new(settings.ip_max_requests).expect("ip_max_requests must be non-zero");
        let window = Duration::from_secs(settings.ip_window_secs.max(1));

        let quota = Quota::with_period(window / max_requests.get())
            .expect("rate limit window must be non-zero")
            .allow_burst(max_requests);
        let limiter = Arc::new(RateLimiter::keyed(quota));

        // Sweep idle per-IP state on an interval (default: every 5 minutes).
        let sweeper = Arc::clone(&limiter);
        let sweep_interval = Duration::from_secs(settings.sweep_interval_secs.max(1));
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(sweep_interval);
            tick.tick().await; // first tick fires immediately
            loop {
                tick.tick().await;
                let before = sweeper.len();
                sweeper.retain_recent();
                let after = sweeper.len();
                if before != after {
                    log::debug!("Rate limiter sweep: {} -> {} tracked IPs", before, after);
                }
            }
        });

        Self {
            limiter,
            clock: QuantaClock::default(),
        }
    }

    /// Checks the caller's IP against the quota. On rejection returns the
    /// number of seconds after which a retry may succeed.
    pub fn check(&self, ip: IpAddr) -> Result<(), u64> {
        match self.limiter.check_key(&ip) {
            Ok(_) => Ok(()),
            Err(not_until) => {
                let wait = not_until.wait_time_from(self.clock.now());
                let mut secs = wait.as_secs();
                if wait.subsec_nanos() > 0 {
                    secs += 1;
                }
                Err(secs.max(1))
            }
        }
    }
}

pub struct IpRateLimiter {
    limiter: IpLimiter,
}

impl IpRateLimiter {
    pub fn new(limiter: IpLimiter) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for IpRateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Transform = IpRateLimiterService<S>;
    type InitError = ();
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(IpRateLimiterService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct IpRateLimiterService<S> {
    service: Rc<S>,
    limiter: IpLimiter,
}

impl<S, B> Service<ServiceRequest> for IpRateLimiterService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: actix_web::body::MessageBody + 'static,
{
    type Response = ServiceResponse<actix_web::body::BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = Rc::clone(&self.service);
        let limiter = self.limiter.clone();

        let ip = req
            .connection_info()
            .realip_remote_addr()
            .and_then(|addr| IpAddr::from_str(addr).ok())
            .unwrap_or(IpAddr::from([0, 0, 0, 0]));

        Box::pin(async move {
            match limiter.check(ip) {
                Ok(_) => srv.call(req).await.map(|res| res.map_into_boxed_body()),
                Err(retry_after_secs) => {
                    log::warn!("Rate limit exceeded for {}", ip);
                    let response = HttpResponse::TooManyRequests()
                        .insert_header((header::RETRY_AFTER, retry_after_secs.to_string()))
                        .json(serde_json::json!({
                            "error": "Too many requests. Please try again later.",
                            "retry_after_secs": retry_after_secs,
                        }))
                        .map_into_boxed_body();
                    Ok(req.into_response(response))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(max: u32, window_secs: u64) -> RateLimitSettings {
        RateLimitSettings {
            global_per_second: 10,
            ip_max_requests: max,
            ip_window_secs: window_secs,
            sweep_interval_secs: 300,
        }
    }

    #[tokio::test]
    async fn allows_up_to_burst_then_rejects() {
        let limiter = IpLimiter::new(&settings(3, 60));
        let ip = IpAddr::from([10, 0, 0, 1]);

        for _ in 0..3 {
            assert!(limiter.check(ip).is_ok());
        }
        let retry_after = limiter.check(ip).unwrap_err();
        assert!(retry_after >= 1);
    }

    #[tokio::test]
    async fn ips_are_limited_independently() {
        let limiter = IpLimiter::new(&settings(1, 60));
        let first = IpAddr::from([10, 0, 0, 1]);
        let second = IpAddr::from([10, 0, 0, 2]);

        assert!(limiter.check(first).is_ok());
        assert!(limiter.check(first).is_err());
        assert!(limiter.check(second).is_ok());
    }
}

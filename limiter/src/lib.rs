use common::env_config::RateLimitSettings;
use middleware::{
    global::GlobalLimiter,
    ip::{IpLimiter, IpRateLimiter},
};

pub mod middleware {
    pub mod global;
    pub mod ip;
}

pub fn global_middleware(permits_per_second: u32) -> GlobalLimiter {
    GlobalLimiter::new(permits_per_second)
}

/// Builds the shared per-IP limiter state. Call once at startup, outside
/// the server factory closure, so all workers share one state map and a
/// single sweep task.
pub fn ip_limiter(settings: &RateLimitSettings) -> IpLimiter {
    IpLimiter::new(settings)
}

pub fn ip_middleware(limiter: IpLimiter) -> IpRateLimiter {
    IpRateLimiter::new(limiter)
}

//! Login rate limiting middleware.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{
    collections::HashMap,
    net::SocketAddr,
    num::NonZeroU32,
    sync::{Arc, Mutex, PoisonError, RwLock},
    time::{Duration, Instant},
};

use crate::web::error::ApiError;

/// Per-IP rate limiter using Governor.
pub type IpRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Interval between sweeps of idle limiters.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// A client's limiter and when it last tried to log in.
struct ClientLimiter {
    limiter: IpRateLimiter,
    last_seen: Mutex<Instant>,
}

impl ClientLimiter {
    fn new(quota: Quota) -> Self {
        Self {
            limiter: RateLimiter::direct(quota),
            last_seen: Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn idle_for(&self, now: Instant) -> Duration {
        let last_seen = *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);
        now.saturating_duration_since(last_seen)
    }
}

/// Per-client limiters for the login endpoint.
pub struct RateLimitState {
    login_limiters: RwLock<HashMap<String, Arc<ClientLimiter>>>,
    /// Login attempts allowed per minute.
    login_rate_limit: u32,
}

impl RateLimitState {
    pub fn new(login_rate_limit: u32) -> Self {
        Self {
            login_limiters: RwLock::new(HashMap::new()),
            login_rate_limit,
        }
    }

    /// Get or create a rate limiter for the given IP.
    fn limiter_for(&self, ip: &str) -> Arc<ClientLimiter> {
        {
            let read_guard = self
                .login_limiters
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(limiter) = read_guard.get(ip) {
                return Arc::clone(limiter);
            }
        }

        let mut write_guard = self
            .login_limiters
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        // Double-check after acquiring write lock
        if let Some(limiter) = write_guard.get(ip) {
            return Arc::clone(limiter);
        }

        let quota =
            Quota::per_minute(NonZeroU32::new(self.login_rate_limit).unwrap_or(NonZeroU32::MIN));
        let limiter = Arc::new(ClientLimiter::new(quota));
        write_guard.insert(ip.to_string(), Arc::clone(&limiter));
        limiter
    }

    /// Check if a login attempt is allowed for `ip`.
    pub fn check_login(&self, ip: &str) -> bool {
        let client = self.limiter_for(ip);
        client.touch();
        client.limiter.check().is_ok()
    }

    /// Drop limiters of clients idle for at least `max_idle`. Quotas refill
    /// within a minute, so `max_idle` should not be shorter than that.
    pub fn cleanup_idle(&self, max_idle: Duration) {
        let now = Instant::now();
        self.login_limiters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, client| client.idle_for(now) < max_idle);
    }

    /// Drop limiters idle for a whole cleanup interval.
    pub fn cleanup(&self) {
        self.cleanup_idle(CLEANUP_INTERVAL);
    }

    /// Start a background task to periodically clean up old entries.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(CLEANUP_INTERVAL).await;
                self.cleanup();
            }
        });
    }
}

/// Extract client IP from request.
fn get_client_ip(req: &Request<Body>) -> String {
    // Behind a reverse proxy
    if let Some(forwarded) = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(ip) = forwarded.split(',').next() {
            return ip.trim().to_string();
        }
    }

    if let Some(real_ip) = req
        .headers()
        .get("X-Real-IP")
        .and_then(|v| v.to_str().ok())
    {
        return real_ip.to_string();
    }

    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

/// Rate limiting middleware for the login endpoint.
pub async fn login_rate_limit(
    state: Arc<RateLimitState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = get_client_ip(&req);

    if !state.check_login(&ip) {
        tracing::warn!(ip = %ip, "Login rate limit exceeded");
        return ApiError::too_many_requests("Too many login attempts. Please try again later.")
            .into_response();
    }

    next.run(req).await
}

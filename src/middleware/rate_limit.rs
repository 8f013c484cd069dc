//! Per-client-IP token buckets with idle eviction.

use crate::config::LimiterConfig;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

type DirectLimiter = GovernorRateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
    governor::middleware::NoOpMiddleware,
>;

pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);
pub const IDLE_TTL: Duration = Duration::from_secs(180);

struct Client {
    limiter: DirectLimiter,
    last_seen: Instant,
}

struct Inner {
    enabled: bool,
    quota: Quota,
    clients: Mutex<HashMap<String, Client>>,
}

/// Shared handle; clones see the same client table.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

fn quota(config: &LimiterConfig) -> Quota {
    let burst = NonZeroU32::new(config.burst.max(1)).unwrap_or(NonZeroU32::MIN);
    Duration::try_from_secs_f64(1.0 / config.rps)
        .ok()
        .and_then(Quota::with_period)
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}

impl RateLimiter {
    pub fn new(config: &LimiterConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                enabled: config.enabled,
                quota: quota(config),
                clients: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn enabled(&self) -> bool {
        self.inner.enabled
    }

    /// Take one token from `client`'s bucket. Always true when limiting is disabled.
    pub fn check(&self, client: &str) -> bool {
        if !self.inner.enabled {
            return true;
        }
        let now = Instant::now();
        let mut clients = self.inner.clients.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = clients.entry(client.to_string()).or_insert_with(|| Client {
            limiter: GovernorRateLimiter::direct(self.inner.quota),
            last_seen: now,
        });
        entry.last_seen = now;
        entry.limiter.check().is_ok()
    }

    /// Drop clients not seen for `idle`; returns how many were removed.
    pub fn sweep(&self, idle: Duration) -> usize {
        self.sweep_at(Instant::now(), idle)
    }

    fn sweep_at(&self, now: Instant, idle: Duration) -> usize {
        let mut clients = self.inner.clients.lock().unwrap_or_else(PoisonError::into_inner);
        let before = clients.len();
        clients.retain(|_, c| now.duration_since(c.last_seen) <= idle);
        before - clients.len()
    }

    pub fn tracked_clients(&self) -> usize {
        self.inner.clients.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Evict idle clients every [`SWEEP_INTERVAL`] for the life of the process.
    pub fn spawn_sweeper(&self) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                ticker.tick().await;
                let evicted = limiter.sweep(IDLE_TTL);
                if evicted > 0 {
                    tracing::debug!(evicted, remaining = limiter.tracked_clients(), "rate limiter sweep");
                }
            }
        })
    }
}

/// Client address: first `X-Forwarded-For` entry, then `X-Real-IP`, then the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    forwarded
        .or(real_ip)
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn request_client_ip(req: &Request) -> String {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    client_ip(req.headers(), peer)
}

pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if state.limiter.enabled() {
        let ip = request_client_ip(&req);
        if !state.limiter.check(&ip) {
            tracing::debug!(client = %ip, "rate limit exceeded");
            return AppError::RateLimitExceeded.into_response();
        }
    }
    next.run(req).await
}

//! Shared application state for all routes.

use crate::config::Config;
use crate::middleware::RateLimiter;
use crate::store::Models;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub models: Models,
    /// Per-client buckets; one instance for the whole process.
    pub limiter: RateLimiter,
}

impl AppState {
    pub fn new(config: Config, models: Models) -> Self {
        let limiter = RateLimiter::new(&config.limiter);
        Self {
            config: Arc::new(config),
            models,
            limiter,
        }
    }
}

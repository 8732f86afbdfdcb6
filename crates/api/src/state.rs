use std::sync::Arc;

use realms_core::rate_limit::RateLimiter;

use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheap to clone: the pool and limiter are handles, the config is behind
/// an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub pool: realms_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Per-address limiter guarding login, registration and username
    /// changes.
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(pool: realms_db::DbPool, config: ServerConfig) -> Self {
        let rate_limiter = RateLimiter::new(
            config.rate_limit_max_requests,
            std::time::Duration::from_secs(config.rate_limit_window_secs),
        );
        Self {
            pool,
            config: Arc::new(config),
            rate_limiter,
        }
    }
}

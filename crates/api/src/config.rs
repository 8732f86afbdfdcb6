use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins, from the comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Upper bound on how long in-flight requests may drain after a
    /// shutdown signal.
    pub shutdown_timeout_secs: u64,
    /// Requests allowed per client address inside one rate-limit window.
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_secs: u64,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                    |
    /// | `RATE_LIMIT_MAX_REQUESTS` | `20`                    |
    /// | `RATE_LIMIT_WINDOW_SECS`  | `60`                    |
    ///
    /// JWT settings are read by [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host,
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            rate_limit_max_requests: env_or("RATE_LIMIT_MAX_REQUESTS", 20),
            rate_limit_window_secs: env_or("RATE_LIMIT_WINDOW_SECS", 60),
            jwt: JwtConfig::from_env(),
        }
    }
}

/// Parse an env var, falling back to `default` when unset.
///
/// # Panics
///
/// Panics when the variable is set but does not parse.
fn env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            panic!("{key} must be a valid {}: {e}", std::any::type_name::<T>())
        }),
        Err(_) => default,
    }
}

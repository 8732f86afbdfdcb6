//! Per-address rate limiting for credential endpoints.
//!
//! Put [`RateLimit`] first in a handler's argument list so the request is
//! counted before the body is parsed.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::error::AppError;
use crate::state::AppState;

/// Key used when no forwarding header identifies the client.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Passes when the caller's address still has budget in the current window.
/// Carries the resolved client address.
#[derive(Debug, Clone)]
pub struct RateLimit(pub String);

impl FromRequestParts<AppState> for RateLimit {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ip = client_ip(&parts.headers);
        if let Err(err) = state.rate_limiter.check(&ip).await {
            tracing::warn!(ip = %ip, path = %parts.uri.path(), "Rate limit exceeded");
            return Err(err.into());
        }
        Ok(RateLimit(ip))
    }
}

/// Client address: first `x-forwarded-for` hop, then `x-real-ip`, then
/// [`UNKNOWN_CLIENT`].
pub fn client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

//! Request extractors that gate handlers.
//!
//! - [`auth::AuthUser`] -- the bearer-token identity.
//! - [`rbac::RequireAdmin`] / [`rbac::RequireAuth`] -- role gates.
//! - [`rate_limit::RateLimit`] -- per-address request budget.

pub mod auth;
pub mod rate_limit;
pub mod rbac;

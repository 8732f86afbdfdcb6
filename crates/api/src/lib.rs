//! Realms API server library.
//!
//! Config, state, error mapping, extractors, handlers and routes live here
//! so the binary and the integration tests share one router.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;

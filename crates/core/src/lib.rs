//! Domain layer for the Realms companion backend.
//!
//! Everything in this crate is free of database and HTTP concerns: rules
//! formulas, cost calculators, the lean character document and its
//! migration, codex shaping and CSV ingestion, username policy, the
//! encounter tracker, and the in-memory rate limiter.

pub mod campaign;
pub mod character;
pub mod codex;
pub mod costs;
pub mod encounter;
pub mod error;
pub mod library;
pub mod rate_limit;
pub mod roles;
pub mod rules;
pub mod types;
pub mod username;

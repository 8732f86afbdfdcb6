//! Request handlers, one module per resource.
//!
//! Handlers validate input, delegate persistence to `realms_db`
//! repositories and rules to `realms_core`, and map failures through
//! [`crate::error::AppError`].

pub mod admin;
pub mod auth;
pub mod campaigns;
pub mod characters;
pub mod codex;
pub mod costing;
pub mod encounters;
pub mod library;
pub mod me;
pub mod public_library;

//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches

pub mod campaign;
pub mod character;
pub mod codex;
pub mod encounter;
pub mod library;
pub mod role;
pub mod session;
pub mod user;

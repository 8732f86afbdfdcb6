//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000001_create_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Whether a role name carries admin privileges.
pub fn is_admin(role: &str) -> bool {
    role == ROLE_ADMIN
}

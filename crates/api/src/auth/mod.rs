//! Credentials and tokens.
//!
//! - [`password`] -- Argon2id hashing and the password policy.
//! - [`jwt`] -- access tokens and refresh-token hashing.

pub mod jwt;
pub mod password;

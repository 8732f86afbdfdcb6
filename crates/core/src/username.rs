//! Username format, blocklist and change-frequency policy.
//!
//! Uniqueness is enforced by the database through the case-folded
//! `usernames` lookup table; see [`normalize`].

use std::sync::LazyLock;

use chrono::Duration;
use regex::Regex;

use crate::error::CoreError;
use crate::types::Timestamp;

pub const MIN_LENGTH: usize = 3;
pub const MAX_LENGTH: usize = 24;

/// Days a non-admin must wait between username changes.
pub const CHANGE_COOLDOWN_DAYS: i64 = 7;

const USERNAME_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_]*$";

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(USERNAME_PATTERN).expect("valid regex"));

/// Names nobody may take, compared case-insensitively.
const BLOCKED_NAMES: &[&str] = &[
    "root",
    "system",
    "support",
    "staff",
    "official",
    "null",
    "undefined",
    "anonymous",
    "everyone",
    "realms",
];

/// Prefixes reserved for staff accounts.
const RESERVED_PREFIXES: &[&str] = &["admin", "mod"];

/// Lookup key for the `usernames` table.
pub fn normalize(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Check length, character set and blocklist.
pub fn validate(username: &str) -> Result<(), CoreError> {
    let len = username.chars().count();
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&len) {
        return Err(CoreError::Validation(format!(
            "Username must be between {MIN_LENGTH} and {MAX_LENGTH} characters"
        )));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(CoreError::Validation(
            "Username must start with a letter and contain only letters, digits and underscores"
                .into(),
        ));
    }
    if is_blocked(username) {
        return Err(CoreError::Validation(format!(
            "Username '{username}' is not available"
        )));
    }
    Ok(())
}

pub fn is_blocked(username: &str) -> bool {
    let lowered = normalize(username);
    BLOCKED_NAMES.contains(&lowered.as_str())
        || RESERVED_PREFIXES.iter().any(|p| lowered.starts_with(p))
}

/// Enforce the change cooldown.
///
/// Admins are exempt. A user who has never changed their name may always
/// change it. On rejection the error carries the next allowed time.
pub fn check_change_allowed(
    last_changed: Option<Timestamp>,
    now: Timestamp,
    is_admin: bool,
) -> Result<(), CoreError> {
    if is_admin {
        return Ok(());
    }
    let Some(last) = last_changed else {
        return Ok(());
    };
    let next_allowed = last + Duration::days(CHANGE_COOLDOWN_DAYS);
    if now < next_allowed {
        return Err(CoreError::Validation(format!(
            "Username can only be changed once every {CHANGE_COOLDOWN_DAYS} days; \
             next change allowed at {}",
            next_allowed.to_rfc3339()
        )));
    }
    Ok(())
}

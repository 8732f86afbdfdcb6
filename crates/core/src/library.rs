//! User and public content library: powers, techniques, items, creatures.
//!
//! Entries store their creator payload as loose JSON. The cost-relevant
//! subset is extracted on demand by [`crate::costs`].

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

pub const MAX_NAME_LENGTH: usize = 120;
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum LibraryKind {
    Power,
    Technique,
    Item,
    Creature,
}

impl LibraryKind {
    pub const ALL: [LibraryKind; 4] = [
        LibraryKind::Power,
        LibraryKind::Technique,
        LibraryKind::Item,
        LibraryKind::Creature,
    ];

    /// Value stored in the `kind` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Technique => "technique",
            Self::Item => "item",
            Self::Creature => "creature",
        }
    }

    /// Parse a URL segment. Both singular and plural forms are accepted
    /// (`/library/powers` and `/library/power`).
    pub fn from_path(segment: &str) -> Result<Self, CoreError> {
        let singular = segment.strip_suffix('s').unwrap_or(segment);
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == singular)
            .ok_or_else(|| CoreError::Validation(format!("Unknown library kind '{segment}'")))
    }
}

/// Trim and check an entry name.
pub fn validate_name(name: &str) -> Result<String, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("Name is required".into()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_string())
}

pub fn validate_description(description: &str) -> Result<(), CoreError> {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Description must be at most {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Payloads must be JSON objects.
pub fn validate_payload(payload: &serde_json::Value) -> Result<(), CoreError> {
    if !payload.is_object() {
        return Err(CoreError::Validation("Payload must be a JSON object".into()));
    }
    Ok(())
}

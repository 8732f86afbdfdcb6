use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// One codex table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum CodexKind {
    Feats,
    Skills,
    Species,
    Traits,
    Parts,
    Properties,
    Equipment,
    Archetypes,
}

impl CodexKind {
    pub const ALL: [CodexKind; 8] = [
        CodexKind::Feats,
        CodexKind::Skills,
        CodexKind::Species,
        CodexKind::Traits,
        CodexKind::Parts,
        CodexKind::Properties,
        CodexKind::Equipment,
        CodexKind::Archetypes,
    ];

    /// Path segment and CSV file stem.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feats => "feats",
            Self::Skills => "skills",
            Self::Species => "species",
            Self::Traits => "traits",
            Self::Parts => "parts",
            Self::Properties => "properties",
            Self::Equipment => "equipment",
            Self::Archetypes => "archetypes",
        }
    }

    /// Backing table. Only ever one of these fixed names, so it is safe to
    /// interpolate into SQL.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Feats => "codex_feats",
            Self::Skills => "codex_skills",
            Self::Species => "codex_species",
            Self::Traits => "codex_traits",
            Self::Parts => "codex_parts",
            Self::Properties => "codex_properties",
            Self::Equipment => "codex_equipment",
            Self::Archetypes => "codex_archetypes",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.csv", self.as_str())
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == value)
    }

    /// Parse a path segment, failing with a validation error.
    pub fn from_path(value: &str) -> Result<Self, CoreError> {
        Self::parse(value)
            .ok_or_else(|| CoreError::Validation(format!("Unknown codex kind '{value}'")))
    }

    /// Resolve a CSV file name such as `Feats.csv` to its kind.
    pub fn from_file_name(file_name: &str) -> Result<Self, CoreError> {
        let lowered = file_name.trim().to_ascii_lowercase();
        lowered
            .strip_suffix(".csv")
            .and_then(Self::parse)
            .ok_or_else(|| {
                CoreError::Validation(format!("Unrecognised codex file '{file_name}'"))
            })
    }
}

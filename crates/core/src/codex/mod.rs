//! Rules codex: the game's reference data (feats, skills, species, parts...).
//!
//! Rows are stored loosely typed as JSON, the way they arrive from the CSV
//! exports. This module names the codex tables, coerces those loose values,
//! shapes rows into typed views for clients and the cost calculators, and
//! parses CSV imports.

pub mod coerce;
pub mod csv;
pub mod kind;
pub mod views;

pub use csv::{parse_codex_csv, slugify, CodexRecord, ARRAY_COLUMNS};
pub use kind::CodexKind;
pub use views::{shape, CodexView};

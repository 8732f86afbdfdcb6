//! The lean character document and everything that operates on it.
//!
//! - [`data`] -- the typed lean format persisted in `characters.data`.
//! - [`migration`] -- rewrites legacy-shaped blobs into the lean format.
//! - [`sheet`] -- recomputes derived values and budgets on load.

pub mod data;
pub mod migration;
pub mod sheet;

pub use data::{prepare_for_save, CharacterData};
pub use migration::{migrate_to_lean, MigrationReport};
pub use sheet::{derive_sheet, CharacterSheet, LoadoutCost, LoadoutSource, SheetIssue};

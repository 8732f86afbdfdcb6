//! Cost resolution shared by the library and character-sheet handlers.
//!
//! Part and property definitions live in the codex tables; they are loaded
//! per request and shaped through [`realms_core::codex::shape`].

use std::collections::HashMap;

use realms_core::codex::{shape, CodexKind, CodexView};
use realms_core::costs::{
    assess_creature, calculate_item_cost, calculate_power_cost, CreatureDesign, CreatureReport,
    ItemCost, ItemDesign, PartDef, PowerCost, PowerDesign, PropertyDef,
};
use realms_core::error::CoreError;
use realms_core::library::LibraryKind;
use realms_db::models::library::LibraryEntry;
use realms_db::repositories::CodexRepo;
use realms_db::DbPool;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Computed cost of one library entry, tagged with its kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryCost {
    Power(PowerCost),
    Technique(PowerCost),
    Item(ItemCost),
    Creature(CreatureReport),
}

pub async fn load_part_defs(pool: &DbPool) -> AppResult<HashMap<String, PartDef>> {
    let rows = CodexRepo::list(pool, CodexKind::Parts).await?;
    Ok(rows
        .iter()
        .filter_map(|row| match shape(CodexKind::Parts, &row.code, &row.name, &row.data) {
            CodexView::Part(view) => Some((row.code.clone(), view.to_part_def())),
            _ => None,
        })
        .collect())
}

pub async fn load_property_defs(pool: &DbPool) -> AppResult<HashMap<String, PropertyDef>> {
    let rows = CodexRepo::list(pool, CodexKind::Properties).await?;
    Ok(rows
        .iter()
        .filter_map(
            |row| match shape(CodexKind::Properties, &row.code, &row.name, &row.data) {
                CodexView::Property(view) => Some((row.code.clone(), view.to_property_def())),
                _ => None,
            },
        )
        .collect())
}

fn parse_design<T: serde::de::DeserializeOwned>(entry: &LibraryEntry) -> Result<T, CoreError> {
    serde_json::from_value(entry.payload.clone()).map_err(|e| {
        CoreError::Validation(format!("Entry '{}' has an invalid payload: {e}", entry.name))
    })
}

/// Energy and training points of a power or technique payload.
pub fn power_cost(
    entry: &LibraryEntry,
    parts: &HashMap<String, PartDef>,
) -> Result<PowerCost, CoreError> {
    let design: PowerDesign = parse_design(entry)?;
    calculate_power_cost(&design, parts)
}

/// Cost of any library entry. Codex tables are only read for the kinds
/// that need them.
pub async fn cost_entry(pool: &DbPool, entry: &LibraryEntry) -> AppResult<EntryCost> {
    let kind = LibraryKind::from_path(&entry.kind)
        .map_err(|_| AppError::InternalError(format!("Stored kind '{}' is unknown", entry.kind)))?;

    let cost = match kind {
        LibraryKind::Power | LibraryKind::Technique => {
            let parts = load_part_defs(pool).await?;
            let cost = power_cost(entry, &parts)?;
            if kind == LibraryKind::Power {
                EntryCost::Power(cost)
            } else {
                EntryCost::Technique(cost)
            }
        }
        LibraryKind::Item => {
            let properties = load_property_defs(pool).await?;
            let design: ItemDesign = parse_design(entry)?;
            EntryCost::Item(calculate_item_cost(&design, &properties)?)
        }
        LibraryKind::Creature => {
            let design: CreatureDesign = parse_design(entry)?;
            EntryCost::Creature(assess_creature(&design))
        }
    };
    Ok(cost)
}

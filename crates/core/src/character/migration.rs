//! Lean-format migration for stored character documents.
//!
//! Rewrites a loosely-typed character blob in place: resource-pool objects
//! collapse to scalars, derived combat stats are dropped, deprecated keys
//! are renamed and embedded library objects shrink to their ids. Every
//! rewrite is guarded by an absence check, so applying the migration to
//! its own output changes nothing.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::CoreError;

/// Derived values that older clients persisted and the lean format recomputes.
pub const DERIVED_KEYS: &[&str] = &[
    "maxHealth",
    "maxEnergy",
    "defenses",
    "speed",
    "evasion",
    "initiative",
    "terminal",
    "trainingPoints",
    "abilityPointsRemaining",
    "skillPointsRemaining",
];

/// Deprecated top-level keys and their lean replacements.
pub const RENAMED_KEYS: &[(&str, &str)] = &[
    ("mart_prof", "martialProficiency"),
    ("pow_prof", "powerProficiency"),
    ("defenseVals", "defenseBonuses"),
    ("pow_abil", "powerAbility"),
    ("mart_abil", "martialAbility"),
];

const ABILITY_KEYS: [&str; 2] = ["powerAbility", "martialAbility"];

/// How one embedded list shrinks to the lean shape.
struct ListShape {
    key: &'static str,
    /// Keys kept besides `id`.
    keep: &'static [&'static str],
    /// Legacy per-entry keys renamed before filtering.
    renames: &'static [(&'static str, &'static str)],
}

const LIST_SHAPES: &[ListShape] = &[
    ListShape {
        key: "feats",
        keep: &["currentUses"],
        renames: &[],
    },
    ListShape {
        key: "powers",
        keep: &["innate"],
        renames: &[],
    },
    ListShape {
        key: "techniques",
        keep: &[],
        renames: &[],
    },
    ListShape {
        key: "equipment",
        keep: &["quantity", "equipped"],
        renames: &[("qty", "quantity")],
    },
    ListShape {
        key: "skills",
        keep: &["skillVal", "prof"],
        renames: &[("value", "skillVal"), ("val", "skillVal"), ("proficient", "prof")],
    },
];

/// Changes applied by one migration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub changes: Vec<String>,
}

impl MigrationReport {
    pub fn changed(&self) -> bool {
        !self.changes.is_empty()
    }

    fn record(&mut self, change: impl Into<String>) {
        self.changes.push(change.into());
    }
}

/// Rewrite a character document into the lean format in place.
///
/// Fails only when `doc` is not a JSON object.
pub fn migrate_to_lean(doc: &mut Value) -> Result<MigrationReport, CoreError> {
    let obj = doc.as_object_mut().ok_or_else(|| {
        CoreError::Validation("Character data must be a JSON object".to_string())
    })?;

    let mut report = MigrationReport::default();
    collapse_pool(obj, "health", "currentHealth", &mut report);
    collapse_pool(obj, "energy", "currentEnergy", &mut report);
    strip_derived(obj, &mut report);
    rename_keys(obj, &mut report);
    normalize_ability_names(obj, &mut report);
    skills_map_to_list(obj, &mut report);
    for shape in LIST_SHAPES {
        collapse_list(obj, shape, &mut report);
    }
    Ok(report)
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// `{legacy: {current, max}}` becomes `{target: current}`.
fn collapse_pool(
    obj: &mut Map<String, Value>,
    legacy: &str,
    target: &str,
    report: &mut MigrationReport,
) {
    let Some(pool) = obj.remove(legacy) else {
        return;
    };
    let current = match &pool {
        Value::Object(fields) => fields.get("current").cloned(),
        Value::Number(_) => Some(pool.clone()),
        _ => None,
    };
    match current {
        Some(value) if value.is_number() && !obj.contains_key(target) => {
            obj.insert(target.to_string(), value);
            report.record(format!("{legacy}.current -> {target}"));
        }
        _ => report.record(format!("removed {legacy}")),
    }
}

fn strip_derived(obj: &mut Map<String, Value>, report: &mut MigrationReport) {
    for key in DERIVED_KEYS {
        if obj.remove(*key).is_some() {
            report.record(format!("removed {key}"));
        }
    }
}

fn rename_keys(obj: &mut Map<String, Value>, report: &mut MigrationReport) {
    for (from, to) in RENAMED_KEYS {
        let Some(value) = obj.remove(*from) else {
            continue;
        };
        if obj.contains_key(*to) {
            report.record(format!("removed {from} (superseded by {to})"));
        } else {
            obj.insert((*to).to_string(), value);
            report.record(format!("{from} -> {to}"));
        }
    }
}

/// Ability references are stored lowercase; blank ones are dropped.
fn normalize_ability_names(obj: &mut Map<String, Value>, report: &mut MigrationReport) {
    for key in ABILITY_KEYS {
        let normalized = match obj.get(key) {
            Some(Value::String(name)) => {
                let lowered = name.trim().to_ascii_lowercase();
                if lowered == *name {
                    continue;
                }
                lowered
            }
            _ => continue,
        };
        if normalized.is_empty() {
            obj.remove(key);
            report.record(format!("removed blank {key}"));
        } else {
            obj.insert(key.to_string(), Value::String(normalized));
            report.record(format!("normalized {key}"));
        }
    }
}

/// Very old documents keyed skills by id: `{"athletics": {"val": 1}}`.
fn skills_map_to_list(obj: &mut Map<String, Value>, report: &mut MigrationReport) {
    let Some(Value::Object(map)) = obj.get("skills") else {
        return;
    };
    let entries: Vec<Value> = map
        .iter()
        .map(|(id, value)| {
            let mut entry = match value {
                Value::Object(fields) => fields.clone(),
                Value::Number(_) => {
                    let mut fields = Map::new();
                    fields.insert("skillVal".to_string(), value.clone());
                    fields
                }
                _ => Map::new(),
            };
            entry
                .entry("id")
                .or_insert_with(|| Value::String(id.clone()));
            Value::Object(entry)
        })
        .collect();
    obj.insert("skills".to_string(), Value::Array(entries));
    report.record("skills map -> list");
}

fn collapse_list(obj: &mut Map<String, Value>, shape: &ListShape, report: &mut MigrationReport) {
    let Some(Value::Array(items)) = obj.get(shape.key) else {
        return;
    };
    let collapsed: Vec<Value> = items
        .iter()
        .filter_map(|item| collapse_item(item, shape))
        .collect();
    if collapsed != *items {
        obj.insert(shape.key.to_string(), Value::Array(collapsed));
        report.record(format!("collapsed {}", shape.key));
    }
}

/// Reduce one list entry to `{id, ..kept}`; entries with no usable id are dropped.
fn collapse_item(item: &Value, shape: &ListShape) -> Option<Value> {
    match item {
        Value::String(_) | Value::Number(_) => id_text(item).map(|id| json!({ "id": id })),
        Value::Object(fields) => {
            let id = fields
                .get("id")
                .and_then(id_text)
                .or_else(|| fields.get("name").and_then(id_text))?;

            let mut lean = Map::new();
            lean.insert("id".to_string(), Value::String(id));
            for (from, to) in shape.renames {
                if let Some(value) = fields.get(*from) {
                    if !fields.contains_key(*to) && !lean.contains_key(*to) {
                        lean.insert((*to).to_string(), value.clone());
                    }
                }
            }
            for key in shape.keep {
                if let Some(value) = fields.get(*key) {
                    lean.insert((*key).to_string(), value.clone());
                }
            }
            Some(Value::Object(lean))
        }
        _ => None,
    }
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

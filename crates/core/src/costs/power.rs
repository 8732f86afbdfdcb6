//! Power and technique cost calculation.
//!
//! A design selects codex parts (each with up to three option tiers) and
//! optional damage dice. Flat parts add energy, percentage parts multiply
//! it, and the action type scales the result.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{ceil_clean, floor_clean};
use crate::error::CoreError;

/// Die sizes a damage entry may use.
pub const VALID_DIE_SIZES: [i32; 5] = [4, 6, 8, 10, 12];

/// Number of option tiers a part carries.
pub const OPTION_TIERS: usize = 3;

// ---------------------------------------------------------------------------
// Codex-side definitions
// ---------------------------------------------------------------------------

/// Cost of raising one option tier by one level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionCost {
    pub energy: f64,
    pub tp: f64,
}

/// A power/technique part as defined in the codex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartDef {
    pub code: String,
    pub name: String,
    pub base_energy: f64,
    pub base_tp: f64,
    pub options: [OptionCost; OPTION_TIERS],
    /// Percentage parts multiply total energy instead of adding to it.
    pub percentage: bool,
}

// ---------------------------------------------------------------------------
// Design payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ActionType {
    #[default]
    Basic,
    Quick,
    Free,
    Reaction,
    Long,
}

impl ActionType {
    pub fn energy_multiplier(&self) -> f64 {
        match self {
            Self::Basic => 1.0,
            Self::Quick | Self::Reaction => 1.25,
            Self::Free => 1.5,
            Self::Long => 0.75,
        }
    }
}

/// One selected part with its option levels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartSelection {
    pub part_id: String,
    #[serde(default)]
    pub op1: i32,
    #[serde(default)]
    pub op2: i32,
    #[serde(default)]
    pub op3: i32,
}

impl PartSelection {
    fn levels(&self) -> [i32; OPTION_TIERS] {
        [self.op1, self.op2, self.op3]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageDie {
    pub amount: i32,
    pub size: i32,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// The cost-relevant portion of a power or technique payload.
///
/// Other payload keys (name, description, range...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerDesign {
    #[serde(default)]
    pub action_type: ActionType,
    #[serde(default)]
    pub parts: Vec<PartSelection>,
    #[serde(default)]
    pub damage: Vec<DamageDie>,
    /// Weapon label for techniques; not used in costing.
    #[serde(default)]
    pub weapon: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct PowerCost {
    pub energy: i32,
    pub training_points: i32,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Energy and training points for one damage entry list.
fn damage_cost(damage: &[DamageDie]) -> Result<(f64, i32), CoreError> {
    let mut energy = 0.0;
    let mut dice: i32 = 0;
    for die in damage {
        if !VALID_DIE_SIZES.contains(&die.size) {
            return Err(CoreError::Validation(format!(
                "Invalid damage die size d{}; expected one of d4, d6, d8, d10, d12",
                die.size
            )));
        }
        if die.amount < 1 {
            return Err(CoreError::Validation(format!(
                "Damage die amount must be at least 1, got {}",
                die.amount
            )));
        }
        energy += f64::from(die.amount) * f64::from(die.size / 2 - 1);
        dice = dice.saturating_add(die.amount);
    }
    let tp = if dice > 0 { (dice - 1) / 2 } else { 0 };
    Ok((energy, tp))
}

/// Compute the energy and training-point cost of a power or technique.
///
/// `parts` maps codex part codes to their definitions. Unknown part ids,
/// negative option levels and invalid dice are validation errors.
pub fn calculate_power_cost(
    design: &PowerDesign,
    parts: &HashMap<String, PartDef>,
) -> Result<PowerCost, CoreError> {
    let mut flat_energy = 0.0;
    let mut multiplier = 1.0;
    let mut training_points = 0;

    for selection in &design.parts {
        let def = parts.get(&selection.part_id).ok_or_else(|| {
            CoreError::Validation(format!("Unknown part '{}'", selection.part_id))
        })?;

        let levels = selection.levels();
        if levels.iter().any(|l| *l < 0) {
            return Err(CoreError::Validation(format!(
                "Option levels for part '{}' must not be negative",
                selection.part_id
            )));
        }

        let mut energy = def.base_energy;
        let mut tp = def.base_tp;
        for (level, option) in levels.iter().zip(def.options.iter()) {
            energy += f64::from(*level) * option.energy;
            tp += f64::from(*level) * option.tp;
        }

        if def.percentage {
            multiplier *= energy;
        } else {
            flat_energy += energy;
        }
        training_points = floor_clean(tp).saturating_add(training_points);
    }

    let (damage_energy, damage_tp) = damage_cost(&design.damage)?;
    let raw = (flat_energy + damage_energy) * multiplier * design.action_type.energy_multiplier();

    Ok(PowerCost {
        energy: ceil_clean(raw).max(0),
        training_points: training_points.saturating_add(damage_tp),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn part(code: &str, base_energy: f64, base_tp: f64, percentage: bool) -> PartDef {
        PartDef {
            code: code.to_string(),
            name: code.to_string(),
            base_energy,
            base_tp,
            options: [
                OptionCost {
                    energy: 1.0,
                    tp: 0.5,
                },
                OptionCost {
                    energy: 0.5,
                    tp: 0.0,
                },
                OptionCost::default(),
            ],
            percentage,
        }
    }

    fn catalog() -> HashMap<String, PartDef> {
        [
            part("blast", 2.0, 1.0, false),
            part("range", 0.5, 0.0, false),
            part("area", 1.25, 1.0, true),
        ]
        .into_iter()
        .map(|p| (p.code.clone(), p))
        .collect()
    }

    fn select(part_id: &str, op1: i32) -> PartSelection {
        PartSelection {
            part_id: part_id.to_string(),
            op1,
            ..Default::default()
        }
    }

    #[test]
    fn flat_parts_sum() {
        let design = PowerDesign {
            parts: vec![select("blast", 0), select("range", 1)],
            ..Default::default()
        };
        let cost = calculate_power_cost(&design, &catalog()).unwrap();
        // 2 + (0.5 + 1) = 3.5 -> 4
        assert_eq!(cost.energy, 4);
        // floor(1.0) + floor(0.5) = 1
        assert_eq!(cost.training_points, 1);
    }

    #[test]
    fn percentage_parts_multiply() {
        let design = PowerDesign {
            parts: vec![select("blast", 2), select("area", 0)],
            ..Default::default()
        };
        let cost = calculate_power_cost(&design, &catalog()).unwrap();
        // (2 + 2) * 1.25 = 5
        assert_eq!(cost.energy, 5);
        // floor(1 + 1) + floor(1) = 3
        assert_eq!(cost.training_points, 3);
    }

    #[test]
    fn damage_dice_add_energy_and_tp() {
        let design = PowerDesign {
            damage: vec![DamageDie {
                amount: 3,
                size: 8,
                kind: Some("fire".into()),
            }],
            ..Default::default()
        };
        let cost = calculate_power_cost(&design, &catalog()).unwrap();
        assert_eq!(cost.energy, 9);
        assert_eq!(cost.training_points, 1);
    }

    #[test]
    fn action_type_scales_energy() {
        let design = PowerDesign {
            action_type: ActionType::Quick,
            parts: vec![select("blast", 0)],
            ..Default::default()
        };
        assert_eq!(calculate_power_cost(&design, &catalog()).unwrap().energy, 3);

        let design = PowerDesign {
            action_type: ActionType::Long,
            ..design
        };
        assert_eq!(calculate_power_cost(&design, &catalog()).unwrap().energy, 2);
    }

    #[test]
    fn huge_option_levels_and_dice_saturate() {
        let design = PowerDesign {
            parts: vec![select("blast", i32::MAX), select("blast", i32::MAX)],
            damage: vec![
                DamageDie {
                    amount: i32::MAX,
                    size: 4,
                    kind: None,
                },
                DamageDie {
                    amount: i32::MAX,
                    size: 4,
                    kind: None,
                },
            ],
            ..Default::default()
        };
        let cost = calculate_power_cost(&design, &catalog()).unwrap();
        assert_eq!(cost.energy, i32::MAX);
        assert_eq!(cost.training_points, i32::MAX);
    }

    #[test]
    fn unknown_part_is_rejected() {
        let design = PowerDesign {
            parts: vec![select("teleport", 0)],
            ..Default::default()
        };
        assert_matches!(
            calculate_power_cost(&design, &catalog()),
            Err(CoreError::Validation(msg)) if msg.contains("teleport")
        );
    }

    #[test]
    fn invalid_die_size_is_rejected() {
        let design = PowerDesign {
            damage: vec![DamageDie {
                amount: 1,
                size: 7,
                kind: None,
            }],
            ..Default::default()
        };
        assert_matches!(
            calculate_power_cost(&design, &catalog()),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn design_parses_from_library_payload() {
        let payload = serde_json::json!({
            "name": "Fire Bolt",
            "actionType": "quick",
            "parts": [{ "partId": "blast", "op1": 1 }],
            "damage": [{ "amount": 1, "size": 6, "type": "fire" }],
            "range": 6
        });
        let design: PowerDesign = serde_json::from_value(payload).unwrap();
        assert_eq!(design.action_type, ActionType::Quick);
        assert_eq!(design.parts[0].op1, 1);
        assert_eq!(design.damage[0].kind.as_deref(), Some("fire"));
    }
}

//! Creature stat-block budgets.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::rules::{self, AbilityScores, Budget};

/// Base health/energy pool for a level 1 creature.
const CREATURE_BASE_POOL: i32 = 26;
const CREATURE_POOL_PER_LEVEL: i32 = 6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatureSkill {
    pub id: String,
    #[serde(default)]
    pub value: i32,
}

/// The budget-relevant portion of a creature payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatureDesign {
    #[serde(default = "default_level")]
    pub level: i32,
    #[serde(default)]
    pub abilities: AbilityScores,
    #[serde(default)]
    pub health_points: i32,
    #[serde(default)]
    pub energy_points: i32,
    #[serde(default)]
    pub skills: Vec<CreatureSkill>,
}

fn default_level() -> i32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct CreatureReport {
    pub level: i32,
    pub ability_points: Budget,
    pub skill_points: Budget,
    pub health_energy_points: Budget,
    pub training_points: i32,
    pub max_health: i32,
    pub max_energy: i32,
}

pub fn creature_skill_points_total(level: i32) -> i32 {
    5 + rules::clamp_level(level)
}

pub fn creature_health_energy_total(level: i32) -> i32 {
    CREATURE_BASE_POOL + CREATURE_POOL_PER_LEVEL * (rules::clamp_level(level) - 1)
}

/// Evaluate a creature design against its level's budgets.
///
/// Creatures power their abilities from their highest ability score.
pub fn assess_creature(design: &CreatureDesign) -> CreatureReport {
    let level = rules::clamp_level(design.level);
    let power_ability = design.abilities.highest();
    let skills_spent = design
        .skills
        .iter()
        .map(|s| s.value.max(0))
        .fold(0, i32::saturating_add);

    CreatureReport {
        level,
        ability_points: Budget::new(
            rules::ability_points_total(level),
            rules::ability_points_spent(&design.abilities),
        ),
        skill_points: Budget::new(creature_skill_points_total(level), skills_spent),
        health_energy_points: Budget::new(
            creature_health_energy_total(level),
            design.health_points.saturating_add(design.energy_points),
        ),
        training_points: rules::training_points_total(level, power_ability),
        max_health: rules::max_health(level, design.abilities.vitality, design.health_points),
        max_energy: rules::max_energy(level, power_ability, design.energy_points),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_three_creature_budget() {
        let design: CreatureDesign = serde_json::from_value(serde_json::json!({
            "name": "Dire Wolf",
            "level": 3,
            "abilities": { "strength": 3, "vitality": 2, "agility": 2 },
            "healthPoints": 20,
            "energyPoints": 10,
            "skills": [{ "id": "athletics", "value": 2 }, { "id": "stealth", "value": 1 }]
        }))
        .unwrap();

        let report = assess_creature(&design);
        assert_eq!(report.ability_points, Budget::new(7, 7));
        assert_eq!(report.skill_points, Budget::new(8, 3));
        assert_eq!(report.health_energy_points, Budget::new(38, 30));
        assert_eq!(report.max_health, 8 + 6 + 20);
        assert_eq!(report.max_energy, 9 + 10);
        assert_eq!(report.training_points, 22 + 3 + 5 * 2);
    }

    #[test]
    fn missing_level_defaults_to_one() {
        let design: CreatureDesign = serde_json::from_value(serde_json::json!({})).unwrap();
        let report = assess_creature(&design);
        assert_eq!(report.level, 1);
        assert_eq!(report.health_energy_points.total, 26);
    }

    #[test]
    fn oversized_creature_values_saturate() {
        let design: CreatureDesign = serde_json::from_value(serde_json::json!({
            "level": 30,
            "abilities": { "strength": i32::MAX, "vitality": i32::MAX },
            "healthPoints": i32::MAX,
            "energyPoints": i32::MAX,
            "skills": [{ "id": "a", "value": i32::MAX }, { "id": "b", "value": i32::MAX }]
        }))
        .unwrap();

        let report = assess_creature(&design);
        assert!(report.ability_points.is_over());
        assert_eq!(report.skill_points.spent, i32::MAX);
        assert_eq!(report.health_energy_points.spent, i32::MAX);
        assert_eq!(report.max_health, i32::MAX);
        assert_eq!(report.training_points, i32::MAX);
    }
}

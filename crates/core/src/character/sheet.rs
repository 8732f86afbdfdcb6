//! Derived character sheet.
//!
//! Recomputes every display value from the lean document on load and
//! reports (without rejecting) any budget the character overspends.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::data::CharacterData;
use crate::rules::{self, Ability, Budget, Defense};

/// Where a training-point cost on the sheet comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum LoadoutSource {
    Power,
    Technique,
}

/// A resolved power or technique with its computed cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct LoadoutCost {
    pub source: LoadoutSource,
    pub id: String,
    pub name: String,
    pub energy: i32,
    pub training_points: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct DefenseScore {
    pub defense: Defense,
    pub bonus: i32,
    pub score: i32,
}

/// A rule the character currently breaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct SheetIssue {
    pub code: String,
    pub message: String,
}

impl SheetIssue {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct CharacterSheet {
    pub level: i32,
    pub max_health: i32,
    pub max_energy: i32,
    pub current_health: i32,
    pub current_energy: i32,
    pub terminal_threshold: i32,
    pub defenses: Vec<DefenseScore>,
    pub speed: i32,
    pub evasion: i32,
    pub initiative: i32,
    pub ability_points: Budget,
    pub skill_points: Budget,
    pub health_energy_points: Budget,
    pub training_points: Budget,
    pub proficiency: Budget,
    pub feat_slots: Budget,
    pub loadout: Vec<LoadoutCost>,
    pub issues: Vec<SheetIssue>,
}

/// Compute the full sheet for a lean character document.
///
/// `loadout` holds the already-resolved costs of the character's powers and
/// techniques; resolving them needs the library and codex, which live
/// outside this crate.
pub fn derive_sheet(data: &CharacterData, loadout: &[LoadoutCost]) -> CharacterSheet {
    let level = rules::clamp_level(data.level);
    let abilities = &data.abilities;
    let power_ability = data.power_ability_value();
    let mut issues = Vec::new();

    let max_health = rules::max_health(level, abilities.vitality, data.health_points);
    let max_energy = rules::max_energy(level, power_ability, data.energy_points);

    let defenses = Defense::ALL
        .into_iter()
        .map(|defense| {
            let bonus = data.defense_bonuses.get(defense);
            DefenseScore {
                defense,
                bonus,
                score: rules::defense_score(abilities.get(defense.ability()), bonus),
            }
        })
        .collect::<Vec<_>>();

    // Abilities.
    let ability_points = Budget::new(
        rules::ability_points_total(level),
        rules::ability_points_spent(abilities),
    );
    if ability_points.is_over() {
        issues.push(over_budget("ability_points_over", "Ability points", &ability_points));
    }
    let cap = rules::ability_cap(level);
    for ability in Ability::ALL {
        let value = abilities.get(ability);
        if value > cap {
            issues.push(SheetIssue::new(
                "ability_above_cap",
                format!("{} {value} exceeds the level {level} cap of {cap}", ability.as_str()),
            ));
        }
        if value < rules::ABILITY_FLOOR {
            issues.push(SheetIssue::new(
                "ability_below_floor",
                format!(
                    "{} {value} is below the floor of {}",
                    ability.as_str(),
                    rules::ABILITY_FLOOR
                ),
            ));
        }
    }

    // Skills and defense bonuses share one pool.
    let mut skill_spent = 0;
    for skill in &data.skills {
        skill_spent = rules::skill_cost(skill.skill_val, skill.prof).saturating_add(skill_spent);
        if skill.skill_val > rules::MAX_SKILL_VALUE {
            issues.push(SheetIssue::new(
                "skill_value_above_cap",
                format!(
                    "Skill '{}' value {} exceeds {}",
                    skill.id,
                    skill.skill_val,
                    rules::MAX_SKILL_VALUE
                ),
            ));
        }
        if skill.skill_val > 0 && !skill.prof {
            issues.push(SheetIssue::new(
                "skill_value_without_proficiency",
                format!("Skill '{}' has a value but no proficiency", skill.id),
            ));
        }
    }
    for score in &defenses {
        skill_spent = rules::defense_bonus_cost(score.bonus).saturating_add(skill_spent);
        if score.bonus > level {
            issues.push(SheetIssue::new(
                "defense_bonus_above_cap",
                format!(
                    "{} bonus {} exceeds the level cap of {level}",
                    score.defense.as_str(),
                    score.bonus
                ),
            ));
        }
    }
    let skill_points = Budget::new(rules::skill_points_total(level), skill_spent);
    if skill_points.is_over() {
        issues.push(over_budget("skill_points_over", "Skill points", &skill_points));
    }

    let health_energy_points = Budget::new(
        rules::health_energy_points_total(level),
        data.health_points.saturating_add(data.energy_points),
    );
    if health_energy_points.is_over() {
        issues.push(over_budget(
            "health_energy_points_over",
            "Health/energy points",
            &health_energy_points,
        ));
    }

    let training_points = Budget::new(
        rules::training_points_total(level, power_ability),
        loadout
            .iter()
            .map(|l| l.training_points)
            .fold(0, i32::saturating_add),
    );
    if training_points.is_over() {
        issues.push(over_budget("training_points_over", "Training points", &training_points));
    }

    let proficiency = Budget::new(
        rules::proficiency_total(level),
        data.martial_proficiency
            .saturating_add(data.power_proficiency),
    );
    if proficiency.is_over() {
        issues.push(over_budget("proficiency_over", "Proficiency", &proficiency));
    }

    let feat_slots = Budget::new(
        rules::archetype_feat_slots(level) + rules::character_feat_slots(level),
        i32::try_from(data.feats.len()).unwrap_or(i32::MAX),
    );
    if feat_slots.is_over() {
        issues.push(over_budget("feat_slots_over", "Feat slots", &feat_slots));
    }

    CharacterSheet {
        level,
        max_health,
        max_energy,
        current_health: data.current_health.unwrap_or(max_health),
        current_energy: data.current_energy.unwrap_or(max_energy),
        terminal_threshold: rules::terminal_threshold(max_health),
        defenses,
        speed: rules::speed(abilities.agility),
        evasion: rules::evasion(abilities.agility),
        initiative: rules::initiative_bonus(abilities.agility),
        ability_points,
        skill_points,
        health_energy_points,
        training_points,
        proficiency,
        feat_slots,
        loadout: loadout.to_vec(),
        issues,
    }
}

fn over_budget(code: &str, label: &str, budget: &Budget) -> SheetIssue {
    SheetIssue::new(
        code,
        format!(
            "{label}: spent {} of {} ({} over)",
            budget.spent, budget.total, -budget.remaining
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::data::{FeatEntry, SkillEntry};
    use crate::rules::{AbilityScores, DefenseBonuses};

    fn fighter() -> CharacterData {
        CharacterData {
            level: 1,
            power_ability: Some(Ability::Charisma),
            abilities: AbilityScores {
                strength: 2,
                vitality: 2,
                agility: 1,
                acuity: 0,
                intelligence: 0,
                charisma: 2,
            },
            defense_bonuses: DefenseBonuses {
                might: 1,
                ..Default::default()
            },
            health_points: 10,
            energy_points: 8,
            skills: vec![SkillEntry {
                id: "athletics".into(),
                skill_val: 1,
                prof: true,
            }],
            feats: vec![FeatEntry {
                id: "tough".into(),
                current_uses: None,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn derives_pools_and_defenses() {
        let sheet = derive_sheet(&fighter(), &[]);
        assert_eq!(sheet.max_health, 8 + 2 + 10);
        assert_eq!(sheet.max_energy, 2 + 8);
        assert_eq!(sheet.current_health, sheet.max_health);
        assert_eq!(sheet.terminal_threshold, 5);
        assert_eq!(sheet.speed, 6);
        assert_eq!(sheet.evasion, 11);

        let might = sheet
            .defenses
            .iter()
            .find(|d| d.defense == Defense::Might)
            .unwrap();
        assert_eq!(might.score, 13);
    }

    #[test]
    fn budgets_balance_for_a_legal_build() {
        let sheet = derive_sheet(&fighter(), &[]);
        assert_eq!(sheet.ability_points, Budget::new(7, 7));
        // athletics: 1 + 1, might bonus: 2
        assert_eq!(sheet.skill_points, Budget::new(5, 4));
        assert_eq!(sheet.health_energy_points, Budget::new(18, 18));
        assert_eq!(sheet.feat_slots, Budget::new(2, 1));
        assert!(sheet.issues.is_empty(), "{:?}", sheet.issues);
    }

    #[test]
    fn training_points_come_from_loadout() {
        let loadout = vec![LoadoutCost {
            source: LoadoutSource::Power,
            id: "7".into(),
            name: "Fire Bolt".into(),
            energy: 4,
            training_points: 30,
        }];
        let sheet = derive_sheet(&fighter(), &loadout);
        assert_eq!(sheet.training_points, Budget::new(24, 30));
        assert!(sheet.issues.iter().any(|i| i.code == "training_points_over"));
    }

    #[test]
    fn overspending_is_reported_not_rejected() {
        let mut data = fighter();
        data.abilities.strength = 5;
        data.skills.push(SkillEntry {
            id: "stealth".into(),
            skill_val: 2,
            prof: false,
        });

        let sheet = derive_sheet(&data, &[]);
        let codes: Vec<&str> = sheet.issues.iter().map(|i| i.code.as_str()).collect();
        assert!(codes.contains(&"ability_points_over"));
        assert!(codes.contains(&"ability_above_cap"));
        assert!(codes.contains(&"skill_value_without_proficiency"));
        assert!(codes.contains(&"skill_points_over"));
    }

    #[test]
    fn stored_current_values_are_kept() {
        let mut data = fighter();
        data.current_health = Some(3);
        data.current_energy = Some(0);
        let sheet = derive_sheet(&data, &[]);
        assert_eq!(sheet.current_health, 3);
        assert_eq!(sheet.current_energy, 0);
    }

    #[test]
    fn extreme_stored_values_do_not_overflow() {
        let data = CharacterData {
            level: 30,
            power_ability: Some(Ability::Strength),
            abilities: AbilityScores {
                strength: i32::MAX,
                vitality: i32::MAX,
                ..Default::default()
            },
            defense_bonuses: DefenseBonuses {
                might: i32::MAX,
                ..Default::default()
            },
            health_points: i32::MAX,
            energy_points: i32::MAX,
            martial_proficiency: i32::MAX,
            power_proficiency: i32::MAX,
            skills: vec![
                SkillEntry {
                    id: "athletics".into(),
                    skill_val: i32::MAX,
                    prof: true,
                },
                SkillEntry {
                    id: "stealth".into(),
                    skill_val: i32::MAX,
                    prof: true,
                },
            ],
            ..Default::default()
        };
        let sheet = derive_sheet(&data, &[]);
        assert_eq!(sheet.max_health, i32::MAX);
        assert!(sheet.ability_points.is_over());
        assert!(sheet.skill_points.is_over());
        assert!(sheet.health_energy_points.is_over());
        assert!(sheet.issues.iter().any(|i| i.code == "proficiency_over"));
    }
}

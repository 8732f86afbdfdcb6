//! Typed lean character document.
//!
//! Only IDs and user-entered values are stored. Anything derivable (max
//! health, defenses, remaining points...) is recomputed by
//! [`super::sheet::derive_sheet`] and never persisted.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::migration::migrate_to_lean;
use crate::error::CoreError;
use crate::rules::{self, Ability, AbilityScores, DefenseBonuses};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct SkillEntry {
    pub id: String,
    pub skill_val: i32,
    pub prof: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FeatEntry {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_uses: Option<i32>,
}

/// Reference to a power in the owner's library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PowerEntry {
    pub id: String,
    #[serde(default)]
    pub innate: bool,
}

/// Reference to a technique in the owner's library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TechniqueEntry {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct EquipmentEntry {
    pub id: String,
    pub quantity: i32,
    pub equipped: bool,
}

impl Default for EquipmentEntry {
    fn default() -> Self {
        Self {
            id: String::new(),
            quantity: 1,
            equipped: false,
        }
    }
}

/// The lean character document stored in `characters.data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct CharacterData {
    pub level: i32,
    pub archetype_id: Option<String>,
    pub power_ability: Option<Ability>,
    pub martial_ability: Option<Ability>,
    pub species_id: Option<String>,
    pub abilities: AbilityScores,
    pub defense_bonuses: DefenseBonuses,
    /// Health/energy points allocated into health.
    pub health_points: i32,
    /// Health/energy points allocated into energy.
    pub energy_points: i32,
    pub current_health: Option<i32>,
    pub current_energy: Option<i32>,
    pub martial_proficiency: i32,
    pub power_proficiency: i32,
    pub skills: Vec<SkillEntry>,
    pub feats: Vec<FeatEntry>,
    pub powers: Vec<PowerEntry>,
    pub techniques: Vec<TechniqueEntry>,
    pub equipment: Vec<EquipmentEntry>,
    pub notes: String,
}

impl Default for CharacterData {
    fn default() -> Self {
        Self {
            level: rules::MIN_LEVEL,
            archetype_id: None,
            power_ability: None,
            martial_ability: None,
            species_id: None,
            abilities: AbilityScores::default(),
            defense_bonuses: DefenseBonuses::default(),
            health_points: 0,
            energy_points: 0,
            current_health: None,
            current_energy: None,
            martial_proficiency: 0,
            power_proficiency: 0,
            skills: Vec::new(),
            feats: Vec::new(),
            powers: Vec::new(),
            techniques: Vec::new(),
            equipment: Vec::new(),
            notes: String::new(),
        }
    }
}

impl CharacterData {
    /// Value of the archetype's power ability, or 0 when none is chosen.
    pub fn power_ability_value(&self) -> i32 {
        self.power_ability
            .map(|a| self.abilities.get(a))
            .unwrap_or(0)
    }

    /// Bound every numeric field to [`rules::MAX_STORED_SCORE`]. Overspending
    /// stays representable so the sheet can still report it.
    pub fn clamp_scores(&mut self) {
        let clamp = rules::clamp_score;
        for ability in [
            &mut self.abilities.strength,
            &mut self.abilities.vitality,
            &mut self.abilities.agility,
            &mut self.abilities.acuity,
            &mut self.abilities.intelligence,
            &mut self.abilities.charisma,
        ] {
            *ability = clamp(*ability);
        }
        for bonus in [
            &mut self.defense_bonuses.might,
            &mut self.defense_bonuses.fortitude,
            &mut self.defense_bonuses.reflex,
            &mut self.defense_bonuses.discernment,
            &mut self.defense_bonuses.mental_fortitude,
            &mut self.defense_bonuses.resolve,
        ] {
            *bonus = clamp(*bonus);
        }
        self.health_points = clamp(self.health_points);
        self.energy_points = clamp(self.energy_points);
        self.current_health = self.current_health.map(clamp);
        self.current_energy = self.current_energy.map(clamp);
        self.martial_proficiency = clamp(self.martial_proficiency);
        self.power_proficiency = clamp(self.power_proficiency);
        for skill in &mut self.skills {
            skill.skill_val = clamp(skill.skill_val);
        }
        for feat in &mut self.feats {
            feat.current_uses = feat.current_uses.map(clamp);
        }
        for item in &mut self.equipment {
            item.quantity = item.quantity.clamp(0, rules::MAX_STORED_SCORE);
        }
    }

    /// Library entry ids referenced by powers and techniques.
    pub fn library_refs(&self) -> impl Iterator<Item = &str> {
        self.powers
            .iter()
            .map(|p| p.id.as_str())
            .chain(self.techniques.iter().map(|t| t.id.as_str()))
    }
}

/// Normalize an incoming character blob into the lean format.
///
/// Runs the lean migration (so clients still sending legacy or fully
/// expanded documents are accepted), then deserializes into
/// [`CharacterData`], which drops every key the lean format does not know.
pub fn prepare_for_save(mut raw: serde_json::Value) -> Result<CharacterData, CoreError> {
    migrate_to_lean(&mut raw)?;
    let mut data: CharacterData = serde_json::from_value(raw)
        .map_err(|e| CoreError::Validation(format!("Invalid character data: {e}")))?;
    data.level = rules::clamp_level(data.level);
    data.clamp_scores();
    Ok(data)
}

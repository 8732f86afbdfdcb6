//! Character rules formulas.
//!
//! Pure arithmetic over small fixed-shape records: point budgets, health and
//! energy pools, defenses and the other derived combat values. Nothing here
//! touches storage; callers feed in the lean character document and get
//! numbers back.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const MIN_LEVEL: i32 = 1;
pub const MAX_LEVEL: i32 = 30;

/// Lowest value an ability may be lowered to.
pub const ABILITY_FLOOR: i32 = -2;

/// Magnitude bound applied to every stored score, allocation and bonus.
/// Legal builds sit far below it; anything beyond is clamped on save.
pub const MAX_STORED_SCORE: i32 = 1_000;

/// Highest value a single skill may be raised to.
pub const MAX_SKILL_VALUE: i32 = 3;

/// Ability values above this threshold cost double.
const ABILITY_COST_THRESHOLD: i32 = 3;

pub const BASE_HEALTH: i32 = 8;
pub const BASE_DEFENSE: i32 = 10;
pub const BASE_SPEED: i32 = 6;
pub const BASE_TRAINING_POINTS: i32 = 22;
pub const BASE_ABILITY_POINTS: i32 = 7;
pub const BASE_HEALTH_ENERGY_POINTS: i32 = 18;
pub const HEALTH_ENERGY_POINTS_PER_LEVEL: i32 = 12;

// ---------------------------------------------------------------------------
// Abilities and defenses
// ---------------------------------------------------------------------------

/// The six character abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Ability {
    Strength,
    Vitality,
    Agility,
    Acuity,
    Intelligence,
    Charisma,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Strength,
        Ability::Vitality,
        Ability::Agility,
        Ability::Acuity,
        Ability::Intelligence,
        Ability::Charisma,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Vitality => "vitality",
            Self::Agility => "agility",
            Self::Acuity => "acuity",
            Self::Intelligence => "intelligence",
            Self::Charisma => "charisma",
        }
    }

    /// Parse an ability name, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        let lowered = value.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|a| a.as_str() == lowered)
    }

    /// The defense this ability feeds.
    pub fn defense(&self) -> Defense {
        match self {
            Self::Strength => Defense::Might,
            Self::Vitality => Defense::Fortitude,
            Self::Agility => Defense::Reflex,
            Self::Acuity => Defense::Discernment,
            Self::Intelligence => Defense::MentalFortitude,
            Self::Charisma => Defense::Resolve,
        }
    }
}

/// The six defenses, one per ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Defense {
    Might,
    Fortitude,
    Reflex,
    Discernment,
    MentalFortitude,
    Resolve,
}

impl Defense {
    pub const ALL: [Defense; 6] = [
        Defense::Might,
        Defense::Fortitude,
        Defense::Reflex,
        Defense::Discernment,
        Defense::MentalFortitude,
        Defense::Resolve,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Might => "might",
            Self::Fortitude => "fortitude",
            Self::Reflex => "reflex",
            Self::Discernment => "discernment",
            Self::MentalFortitude => "mental_fortitude",
            Self::Resolve => "resolve",
        }
    }

    /// The ability this defense is derived from.
    pub fn ability(&self) -> Ability {
        match self {
            Self::Might => Ability::Strength,
            Self::Fortitude => Ability::Vitality,
            Self::Reflex => Ability::Agility,
            Self::Discernment => Ability::Acuity,
            Self::MentalFortitude => Ability::Intelligence,
            Self::Resolve => Ability::Charisma,
        }
    }
}

/// Ability scores as stored in the lean character document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct AbilityScores {
    pub strength: i32,
    pub vitality: i32,
    pub agility: i32,
    pub acuity: i32,
    pub intelligence: i32,
    pub charisma: i32,
}

impl AbilityScores {
    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Vitality => self.vitality,
            Ability::Agility => self.agility,
            Ability::Acuity => self.acuity,
            Ability::Intelligence => self.intelligence,
            Ability::Charisma => self.charisma,
        }
    }

    /// The highest single ability value.
    pub fn highest(&self) -> i32 {
        Ability::ALL
            .into_iter()
            .map(|a| self.get(a))
            .max()
            .unwrap_or(0)
    }
}

/// Skill points allocated directly into defenses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct DefenseBonuses {
    pub might: i32,
    pub fortitude: i32,
    pub reflex: i32,
    pub discernment: i32,
    pub mental_fortitude: i32,
    pub resolve: i32,
}

impl DefenseBonuses {
    pub fn get(&self, defense: Defense) -> i32 {
        match defense {
            Defense::Might => self.might,
            Defense::Fortitude => self.fortitude,
            Defense::Reflex => self.reflex,
            Defense::Discernment => self.discernment,
            Defense::MentalFortitude => self.mental_fortitude,
            Defense::Resolve => self.resolve,
        }
    }
}

// ---------------------------------------------------------------------------
// Budgets
// ---------------------------------------------------------------------------

/// A point pool with its allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct Budget {
    pub total: i32,
    pub spent: i32,
    pub remaining: i32,
}

impl Budget {
    pub fn new(total: i32, spent: i32) -> Self {
        Self {
            total,
            spent,
            remaining: total.saturating_sub(spent),
        }
    }

    pub fn is_over(&self) -> bool {
        self.remaining < 0
    }
}

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

/// Clamp a level into the playable range.
pub fn clamp_level(level: i32) -> i32 {
    level.clamp(MIN_LEVEL, MAX_LEVEL)
}

/// Clamp a client-supplied score into `-MAX_STORED_SCORE..=MAX_STORED_SCORE`.
pub fn clamp_score(value: i32) -> i32 {
    value.clamp(-MAX_STORED_SCORE, MAX_STORED_SCORE)
}

/// Ability points available at `level`: 7, plus one every third level.
pub fn ability_points_total(level: i32) -> i32 {
    BASE_ABILITY_POINTS + (clamp_level(level) - 1) / 3
}

/// Highest value any single ability may reach at `level`.
pub fn ability_cap(level: i32) -> i32 {
    3 + (clamp_level(level) - 1) / 5
}

/// Points consumed by one ability value. Negative values refund points.
pub fn ability_cost(value: i32) -> i32 {
    if value <= ABILITY_COST_THRESHOLD {
        value
    } else {
        (value - ABILITY_COST_THRESHOLD)
            .saturating_mul(2)
            .saturating_add(ABILITY_COST_THRESHOLD)
    }
}

/// Total ability points consumed by a full set of scores.
pub fn ability_points_spent(scores: &AbilityScores) -> i32 {
    Ability::ALL
        .into_iter()
        .map(|a| ability_cost(scores.get(a)))
        .fold(0, i32::saturating_add)
}

/// Skill points available at `level`.
pub fn skill_points_total(level: i32) -> i32 {
    2 + 3 * clamp_level(level)
}

/// Skill points consumed by one skill: one for proficiency plus its value.
pub fn skill_cost(skill_value: i32, proficient: bool) -> i32 {
    skill_value.max(0).saturating_add(i32::from(proficient))
}

/// Skill points consumed by a defense bonus (two per point).
pub fn defense_bonus_cost(bonus: i32) -> i32 {
    bonus.max(0).saturating_mul(2)
}

/// Health/energy allocation points available at `level`.
pub fn health_energy_points_total(level: i32) -> i32 {
    BASE_HEALTH_ENERGY_POINTS + HEALTH_ENERGY_POINTS_PER_LEVEL * (clamp_level(level) - 1)
}

/// Maximum health.
///
/// Positive vitality scales with level; negative vitality applies once.
pub fn max_health(level: i32, vitality: i32, allocated: i32) -> i32 {
    let level = clamp_level(level);
    let vitality_term = if vitality > 0 {
        vitality.saturating_mul(level)
    } else {
        vitality
    };
    BASE_HEALTH
        .saturating_add(vitality_term)
        .saturating_add(allocated)
}

/// Maximum energy, never negative.
pub fn max_energy(level: i32, power_ability: i32, allocated: i32) -> i32 {
    power_ability
        .saturating_mul(clamp_level(level))
        .saturating_add(allocated)
        .max(0)
}

/// Health at or below which a character is terminal (a quarter, rounded up).
pub fn terminal_threshold(max_health: i32) -> i32 {
    if max_health <= 0 {
        0
    } else {
        max_health / 4 + i32::from(max_health % 4 != 0)
    }
}

/// Training points available for powers and techniques.
pub fn training_points_total(level: i32, power_ability: i32) -> i32 {
    let level = clamp_level(level);
    power_ability
        .saturating_add(2)
        .saturating_mul(level - 1)
        .saturating_add(power_ability)
        .saturating_add(BASE_TRAINING_POINTS)
}

/// Combined martial + power proficiency available at `level`.
pub fn proficiency_total(level: i32) -> i32 {
    2 + clamp_level(level) / 5
}

/// Archetype feat slots: one per level.
pub fn archetype_feat_slots(level: i32) -> i32 {
    clamp_level(level)
}

/// Character feat slots: one at level 1 and one more every fourth level.
pub fn character_feat_slots(level: i32) -> i32 {
    1 + (clamp_level(level) - 1) / 4
}

pub fn defense_score(ability: i32, bonus: i32) -> i32 {
    BASE_DEFENSE.saturating_add(ability).saturating_add(bonus)
}

pub fn speed(agility: i32) -> i32 {
    BASE_SPEED.saturating_add(agility / 2)
}

pub fn evasion(agility: i32) -> i32 {
    BASE_DEFENSE.saturating_add(agility)
}

pub fn initiative_bonus(agility: i32) -> i32 {
    agility
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_health_level_one_vitality_two() {
        assert_eq!(max_health(1, 2, 0), 10);
    }

    #[test]
    fn max_health_scales_positive_vitality_by_level() {
        assert_eq!(max_health(5, 2, 4), 8 + 10 + 4);
    }

    #[test]
    fn max_health_negative_vitality_applies_once() {
        assert_eq!(max_health(10, -1, 0), 7);
    }

    #[test]
    fn max_energy_never_negative() {
        assert_eq!(max_energy(3, -2, 1), 0);
        assert_eq!(max_energy(3, 2, 1), 7);
    }

    #[test]
    fn ability_cost_doubles_above_three() {
        assert_eq!(ability_cost(-1), -1);
        assert_eq!(ability_cost(3), 3);
        assert_eq!(ability_cost(4), 5);
        assert_eq!(ability_cost(5), 7);
    }

    #[test]
    fn ability_points_grow_every_third_level() {
        assert_eq!(ability_points_total(1), 7);
        assert_eq!(ability_points_total(3), 7);
        assert_eq!(ability_points_total(4), 8);
        assert_eq!(ability_points_total(10), 10);
    }

    #[test]
    fn level_is_clamped() {
        assert_eq!(ability_points_total(0), ability_points_total(1));
        assert_eq!(skill_points_total(99), skill_points_total(MAX_LEVEL));
    }

    #[test]
    fn training_points_follow_power_ability() {
        assert_eq!(training_points_total(1, 2), 24);
        assert_eq!(training_points_total(3, 2), 24 + 4 * 2);
        assert_eq!(training_points_total(1, 0), 22);
    }

    #[test]
    fn defense_and_movement_values() {
        assert_eq!(defense_score(2, 1), 13);
        assert_eq!(speed(3), 7);
        assert_eq!(speed(-1), 6);
        assert_eq!(evasion(2), 12);
    }

    #[test]
    fn terminal_is_quarter_rounded_up() {
        assert_eq!(terminal_threshold(10), 3);
        assert_eq!(terminal_threshold(8), 2);
        assert_eq!(terminal_threshold(0), 0);
    }

    #[test]
    fn skill_and_defense_costs() {
        assert_eq!(skill_cost(0, true), 1);
        assert_eq!(skill_cost(2, true), 3);
        assert_eq!(defense_bonus_cost(2), 4);
        assert_eq!(defense_bonus_cost(-1), 0);
    }

    #[test]
    fn budget_reports_overspend() {
        let budget = Budget::new(7, 9);
        assert_eq!(budget.remaining, -2);
        assert!(budget.is_over());
        assert!(!Budget::new(7, 7).is_over());
    }

    #[test]
    fn ability_parse_is_case_insensitive() {
        assert_eq!(Ability::parse(" Charisma "), Some(Ability::Charisma));
        assert_eq!(Ability::parse("luck"), None);
        assert_eq!(Ability::Intelligence.defense(), Defense::MentalFortitude);
        assert_eq!(Defense::Reflex.ability(), Ability::Agility);
    }

    #[test]
    fn feat_and_proficiency_slots() {
        assert_eq!(proficiency_total(1), 2);
        assert_eq!(proficiency_total(5), 3);
        assert_eq!(character_feat_slots(1), 1);
        assert_eq!(character_feat_slots(5), 2);
        assert_eq!(archetype_feat_slots(4), 4);
    }

    #[test]
    fn formulas_saturate_instead_of_overflowing() {
        assert_eq!(ability_cost(i32::MAX), i32::MAX);
        assert_eq!(max_health(30, i32::MAX, i32::MAX), i32::MAX);
        assert_eq!(max_energy(30, i32::MAX, 0), i32::MAX);
        assert_eq!(terminal_threshold(i32::MAX), i32::MAX / 4 + 1);
        assert_eq!(training_points_total(30, i32::MAX), i32::MAX);
        assert_eq!(Budget::new(7, i32::MIN).remaining, i32::MAX);
        assert_eq!(clamp_score(2_000_000_000), MAX_STORED_SCORE);
        assert_eq!(clamp_score(-5), -5);
    }
}

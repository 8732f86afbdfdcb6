//! Encounter initiative tracker.
//!
//! The whole tracker state lives in one JSON document per encounter. Clients
//! send [`EncounterAction`]s, the server applies them with
//! [`EncounterState::apply`] and stores the result.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::types::DbId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum EncounterStatus {
    #[default]
    Preparing,
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Combatant {
    pub id: String,
    pub name: String,
    pub initiative: i32,
    pub current_health: i32,
    pub max_health: i32,
    #[serde(default)]
    pub is_ally: bool,
    #[serde(default)]
    pub conditions: Vec<String>,
    /// Set when the combatant is a stored character.
    #[serde(default)]
    pub character_id: Option<DbId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct EncounterState {
    pub status: EncounterStatus,
    pub round: i32,
    pub turn_index: usize,
    pub combatants: Vec<Combatant>,
}

impl Default for EncounterState {
    fn default() -> Self {
        Self {
            status: EncounterStatus::Preparing,
            round: 0,
            turn_index: 0,
            combatants: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "action", rename_all = "snake_case")]
#[ts(export)]
pub enum EncounterAction {
    AddCombatant {
        name: String,
        #[serde(default)]
        initiative: i32,
        max_health: i32,
        #[serde(default)]
        current_health: Option<i32>,
        #[serde(default)]
        is_ally: bool,
        #[serde(default)]
        character_id: Option<DbId>,
    },
    RemoveCombatant {
        combatant_id: String,
    },
    SortInitiative,
    Start,
    NextTurn,
    PreviousTurn,
    Damage {
        combatant_id: String,
        amount: i32,
    },
    Heal {
        combatant_id: String,
        amount: i32,
    },
    AddCondition {
        combatant_id: String,
        condition: String,
    },
    RemoveCondition {
        combatant_id: String,
        condition: String,
    },
    End,
}

impl EncounterState {
    /// The combatant whose turn it is, while the encounter is running.
    pub fn current(&self) -> Option<&Combatant> {
        match self.status {
            EncounterStatus::Active => self.combatants.get(self.turn_index),
            _ => None,
        }
    }

    /// Check a client-supplied or stored state for internal consistency.
    ///
    /// `turn_index` must point at a combatant (or be 0 with none), an active
    /// encounter needs combatants and a round of at least 1, combatant ids
    /// are unique and health stays within `0..=max_health`.
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |msg: String| Err(CoreError::Validation(msg));

        if self.round < 0 {
            return invalid(format!("Round must not be negative, got {}", self.round));
        }
        if self.turn_index > 0 && self.turn_index >= self.combatants.len() {
            return invalid(format!(
                "Turn index {} is out of range for {} combatants",
                self.turn_index,
                self.combatants.len()
            ));
        }
        if self.status == EncounterStatus::Active {
            if self.combatants.is_empty() {
                return invalid("An active encounter needs at least one combatant".into());
            }
            if self.round < 1 {
                return invalid("An active encounter must be in round 1 or later".into());
            }
        }

        let mut seen = std::collections::HashSet::new();
        for combatant in &self.combatants {
            if combatant.id.trim().is_empty() || combatant.name.trim().is_empty() {
                return invalid("Combatants need an id and a name".into());
            }
            if !seen.insert(combatant.id.as_str()) {
                return invalid(format!("Duplicate combatant id '{}'", combatant.id));
            }
            if combatant.max_health < 0 {
                return invalid(format!("Combatant '{}' has negative max health", combatant.name));
            }
            if !(0..=combatant.max_health).contains(&combatant.current_health) {
                return invalid(format!(
                    "Combatant '{}' health {} is outside 0..={}",
                    combatant.name, combatant.current_health, combatant.max_health
                ));
            }
        }
        Ok(())
    }

    /// Apply one action. On error the state is left unchanged.
    pub fn apply(&mut self, action: EncounterAction) -> Result<(), CoreError> {
        self.validate()?;
        if self.status == EncounterStatus::Completed {
            return Err(CoreError::Validation("Encounter has ended".into()));
        }

        match action {
            EncounterAction::AddCombatant {
                name,
                initiative,
                max_health,
                current_health,
                is_ally,
                character_id,
            } => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(CoreError::Validation("Combatant name is required".into()));
                }
                if max_health < 0 {
                    return Err(CoreError::Validation(
                        "Combatant max health must not be negative".into(),
                    ));
                }
                self.combatants.push(Combatant {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: name.to_string(),
                    initiative,
                    current_health: current_health.unwrap_or(max_health).clamp(0, max_health),
                    max_health,
                    is_ally,
                    conditions: Vec::new(),
                    character_id,
                });
            }
            EncounterAction::RemoveCombatant { combatant_id } => {
                let index = self.index_of(&combatant_id)?;
                self.combatants.remove(index);
                if index < self.turn_index {
                    self.turn_index -= 1;
                }
                if self.turn_index >= self.combatants.len() {
                    self.turn_index = 0;
                }
                if self.combatants.is_empty() && self.status == EncounterStatus::Active {
                    self.status = EncounterStatus::Preparing;
                    self.round = 0;
                }
            }
            EncounterAction::SortInitiative => self.sort_initiative(),
            EncounterAction::Start => {
                if self.status != EncounterStatus::Preparing {
                    return Err(CoreError::Validation("Encounter already started".into()));
                }
                if self.combatants.is_empty() {
                    return Err(CoreError::Validation(
                        "Add at least one combatant before starting".into(),
                    ));
                }
                self.sort_initiative();
                self.status = EncounterStatus::Active;
                self.round = 1;
                self.turn_index = 0;
            }
            EncounterAction::NextTurn => {
                self.require_active()?;
                if self.turn_index + 1 >= self.combatants.len() {
                    self.turn_index = 0;
                    self.round = self.round.saturating_add(1);
                } else {
                    self.turn_index += 1;
                }
            }
            EncounterAction::PreviousTurn => {
                self.require_active()?;
                if self.turn_index > 0 {
                    self.turn_index -= 1;
                } else if self.round > 1 {
                    self.round -= 1;
                    self.turn_index = self.combatants.len().saturating_sub(1);
                }
            }
            EncounterAction::Damage {
                combatant_id,
                amount,
            } => {
                let amount = non_negative(amount)?;
                let combatant = self.combatant_mut(&combatant_id)?;
                combatant.current_health = combatant.current_health.saturating_sub(amount).max(0);
            }
            EncounterAction::Heal {
                combatant_id,
                amount,
            } => {
                let amount = non_negative(amount)?;
                let combatant = self.combatant_mut(&combatant_id)?;
                combatant.current_health = combatant
                    .current_health
                    .saturating_add(amount)
                    .min(combatant.max_health);
            }
            EncounterAction::AddCondition {
                combatant_id,
                condition,
            } => {
                let condition = condition.trim().to_string();
                if condition.is_empty() {
                    return Err(CoreError::Validation("Condition is required".into()));
                }
                let combatant = self.combatant_mut(&combatant_id)?;
                if !combatant
                    .conditions
                    .iter()
                    .any(|c| c.eq_ignore_ascii_case(&condition))
                {
                    combatant.conditions.push(condition);
                }
            }
            EncounterAction::RemoveCondition {
                combatant_id,
                condition,
            } => {
                let combatant = self.combatant_mut(&combatant_id)?;
                combatant
                    .conditions
                    .retain(|c| !c.eq_ignore_ascii_case(condition.trim()));
            }
            EncounterAction::End => {
                self.status = EncounterStatus::Completed;
            }
        }
        Ok(())
    }

    /// Descending initiative, allies before enemies on ties, then by name.
    /// While running, the current combatant keeps the turn.
    fn sort_initiative(&mut self) {
        let current_id = self.current().map(|c| c.id.clone());
        self.combatants.sort_by(|a, b| {
            b.initiative
                .cmp(&a.initiative)
                .then_with(|| b.is_ally.cmp(&a.is_ally))
                .then_with(|| a.name.cmp(&b.name))
        });
        if let Some(id) = current_id {
            self.turn_index = self
                .combatants
                .iter()
                .position(|c| c.id == id)
                .unwrap_or(0);
        }
    }

    fn require_active(&self) -> Result<(), CoreError> {
        if self.status != EncounterStatus::Active {
            return Err(CoreError::Validation("Encounter is not active".into()));
        }
        if self.combatants.is_empty() {
            return Err(CoreError::Validation("Encounter has no combatants".into()));
        }
        Ok(())
    }

    fn index_of(&self, combatant_id: &str) -> Result<usize, CoreError> {
        self.combatants
            .iter()
            .position(|c| c.id == combatant_id)
            .ok_or_else(|| CoreError::Validation(format!("Unknown combatant '{combatant_id}'")))
    }

    fn combatant_mut(&mut self, combatant_id: &str) -> Result<&mut Combatant, CoreError> {
        let index = self.index_of(combatant_id)?;
        Ok(&mut self.combatants[index])
    }
}

fn non_negative(amount: i32) -> Result<i32, CoreError> {
    if amount < 0 {
        return Err(CoreError::Validation("Amount must not be negative".into()));
    }
    Ok(amount)
}

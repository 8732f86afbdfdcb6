//! Item cost calculation: item points, training points, currency, rarity.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{ceil_clean, floor_clean};
use crate::error::CoreError;

/// An item property as defined in the codex.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub code: String,
    pub name: String,
    pub base_ip: f64,
    pub base_tp: f64,
    pub base_currency: f64,
    pub option_ip: f64,
    pub option_tp: f64,
    pub option_currency: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySelection {
    pub property_id: String,
    #[serde(default)]
    pub op1: i32,
}

/// The cost-relevant portion of an item payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDesign {
    #[serde(default)]
    pub properties: Vec<PropertySelection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    /// Rarity tier for a currency value.
    pub fn from_currency(currency: i32) -> Self {
        match currency {
            c if c <= 25 => Self::Common,
            c if c <= 100 => Self::Uncommon,
            c if c <= 500 => Self::Rare,
            c if c <= 2_500 => Self::Epic,
            c if c <= 10_000 => Self::Legendary,
            _ => Self::Mythic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ItemCost {
    pub item_points: i32,
    pub training_points: i32,
    pub currency: i32,
    pub rarity: Rarity,
}

/// Compute the cost of an item from its selected properties.
pub fn calculate_item_cost(
    design: &ItemDesign,
    properties: &HashMap<String, PropertyDef>,
) -> Result<ItemCost, CoreError> {
    let mut item_points = 0.0;
    let mut training_points = 0;
    let mut currency = 0.0;

    for selection in &design.properties {
        let def = properties.get(&selection.property_id).ok_or_else(|| {
            CoreError::Validation(format!("Unknown property '{}'", selection.property_id))
        })?;
        if selection.op1 < 0 {
            return Err(CoreError::Validation(format!(
                "Option level for property '{}' must not be negative",
                selection.property_id
            )));
        }
        let level = f64::from(selection.op1);
        item_points += def.base_ip + level * def.option_ip;
        training_points =
            floor_clean(def.base_tp + level * def.option_tp).saturating_add(training_points);
        currency += def.base_currency + level * def.option_currency;
    }

    let currency = ceil_clean(currency).max(0);
    Ok(ItemCost {
        item_points: ceil_clean(item_points),
        training_points,
        currency,
        rarity: Rarity::from_currency(currency),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> HashMap<String, PropertyDef> {
        let damage = PropertyDef {
            code: "damage".into(),
            name: "Damage".into(),
            base_ip: 1.0,
            base_tp: 1.0,
            base_currency: 20.0,
            option_ip: 1.0,
            option_tp: 0.5,
            option_currency: 40.0,
        };
        let light = PropertyDef {
            code: "light".into(),
            name: "Light".into(),
            base_currency: 5.0,
            ..Default::default()
        };
        [damage, light]
            .into_iter()
            .map(|p| (p.code.clone(), p))
            .collect()
    }

    #[test]
    fn sums_properties_and_assigns_rarity() {
        let design = ItemDesign {
            properties: vec![
                PropertySelection {
                    property_id: "damage".into(),
                    op1: 2,
                },
                PropertySelection {
                    property_id: "light".into(),
                    op1: 0,
                },
            ],
        };
        let cost = calculate_item_cost(&design, &catalog()).unwrap();
        assert_eq!(cost.item_points, 3);
        assert_eq!(cost.training_points, 2);
        assert_eq!(cost.currency, 105);
        assert_eq!(cost.rarity, Rarity::Rare);
    }

    #[test]
    fn empty_item_is_common() {
        let cost = calculate_item_cost(&ItemDesign::default(), &catalog()).unwrap();
        assert_eq!(cost.currency, 0);
        assert_eq!(cost.rarity, Rarity::Common);
    }

    #[test]
    fn rarity_thresholds() {
        assert_eq!(Rarity::from_currency(25), Rarity::Common);
        assert_eq!(Rarity::from_currency(26), Rarity::Uncommon);
        assert_eq!(Rarity::from_currency(2_500), Rarity::Epic);
        assert_eq!(Rarity::from_currency(10_001), Rarity::Mythic);
    }

    #[test]
    fn unknown_property_is_rejected() {
        let design = ItemDesign {
            properties: vec![PropertySelection {
                property_id: "vorpal".into(),
                op1: 0,
            }],
        };
        assert!(calculate_item_cost(&design, &catalog()).is_err());
    }
}

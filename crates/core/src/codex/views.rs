//! Typed views over codex rows.
//!
//! Each view reads the columns clients rely on with the lenient readers from
//! [`super::coerce`], so a missing or oddly typed cell degrades to a default
//! instead of breaking the whole listing.

use serde::Serialize;
use serde_json::Value;
use ts_rs::TS;

use super::coerce::{as_bool, as_f64_or, as_i32_or, as_opt_text, as_text, as_text_list};
use super::kind::CodexKind;
use crate::costs::power::{OptionCost, OPTION_TIERS};
use crate::costs::{PartDef, PropertyDef};

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct FeatView {
    pub code: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub ability_req: Vec<String>,
    pub abil_req_val: Vec<i32>,
    pub skill_req: Vec<String>,
    pub level_req: i32,
    pub uses_per_rec: i32,
    pub rec_period: Option<String>,
    pub tags: Vec<String>,
    /// Archetype feat rather than a character feat.
    pub archetype_feat: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct SkillView {
    pub code: String,
    pub name: String,
    pub description: String,
    pub ability: Vec<String>,
    /// Parent skill for sub-skills.
    pub base_skill: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct SpeciesView {
    pub code: String,
    pub name: String,
    pub description: String,
    pub sizes: Vec<String>,
    pub traits: Vec<String>,
    pub flaws: Vec<String>,
    pub characteristics: Vec<String>,
    pub skills: Vec<String>,
    pub languages: Vec<String>,
    pub ave_height: f64,
    pub ave_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct TraitView {
    pub code: String,
    pub name: String,
    pub description: String,
    pub uses_per_rec: i32,
    pub rec_period: Option<String>,
    pub flaw: bool,
    pub characteristic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct PartView {
    pub code: String,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Parts are either for powers or for techniques.
    pub technique: bool,
    pub base_en: f64,
    pub base_tp: f64,
    pub op_1_en: f64,
    pub op_1_tp: f64,
    pub op_2_en: f64,
    pub op_2_tp: f64,
    pub op_3_en: f64,
    pub op_3_tp: f64,
    pub percentage: bool,
    pub mechanic: bool,
}

impl PartView {
    pub fn to_part_def(&self) -> PartDef {
        let options: [OptionCost; OPTION_TIERS] = [
            OptionCost {
                energy: self.op_1_en,
                tp: self.op_1_tp,
            },
            OptionCost {
                energy: self.op_2_en,
                tp: self.op_2_tp,
            },
            OptionCost {
                energy: self.op_3_en,
                tp: self.op_3_tp,
            },
        ];
        PartDef {
            code: self.code.clone(),
            name: self.name.clone(),
            base_energy: self.base_en,
            base_tp: self.base_tp,
            options,
            percentage: self.percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct PropertyView {
    pub code: String,
    pub name: String,
    pub description: String,
    pub property_type: String,
    pub base_ip: f64,
    pub base_tp: f64,
    pub base_c: f64,
    pub op_1_ip: f64,
    pub op_1_tp: f64,
    pub op_1_c: f64,
}

impl PropertyView {
    pub fn to_property_def(&self) -> PropertyDef {
        PropertyDef {
            code: self.code.clone(),
            name: self.name.clone(),
            base_ip: self.base_ip,
            base_tp: self.base_tp,
            base_currency: self.base_c,
            option_ip: self.op_1_ip,
            option_tp: self.op_1_tp,
            option_currency: self.op_1_c,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct EquipmentView {
    pub code: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub currency: i32,
    pub rarity: Option<String>,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ArchetypeView {
    pub code: String,
    pub name: String,
    pub description: String,
    pub abilities: Vec<String>,
    pub feats: Vec<String>,
}

/// A codex row shaped according to its kind.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum CodexView {
    Feat(FeatView),
    Skill(SkillView),
    Species(SpeciesView),
    Trait(TraitView),
    Part(PartView),
    Property(PropertyView),
    Equipment(EquipmentView),
    Archetype(ArchetypeView),
}

impl CodexView {
    pub fn code(&self) -> &str {
        match self {
            Self::Feat(v) => &v.code,
            Self::Skill(v) => &v.code,
            Self::Species(v) => &v.code,
            Self::Trait(v) => &v.code,
            Self::Part(v) => &v.code,
            Self::Property(v) => &v.code,
            Self::Equipment(v) => &v.code,
            Self::Archetype(v) => &v.code,
        }
    }
}

/// Shape one stored row. `name` comes from its own column; everything else
/// is read out of `data`.
pub fn shape(kind: CodexKind, code: &str, name: &str, data: &Value) -> CodexView {
    let get = |key: &str| data.get(key);
    let code = code.to_string();
    let name = name.to_string();
    let description = as_text(get("description"));

    match kind {
        CodexKind::Feats => CodexView::Feat(FeatView {
            code,
            name,
            description,
            category: as_text(get("category")),
            ability_req: as_text_list(get("ability_req")),
            abil_req_val: as_text_list(get("abil_req_val"))
                .iter()
                .map(|s| s.parse().unwrap_or(0))
                .collect(),
            skill_req: as_text_list(get("skill_req")),
            level_req: as_i32_or(get("lvl_req"), 0),
            uses_per_rec: as_i32_or(get("uses_per_rec"), 0),
            rec_period: as_opt_text(get("rec_period")),
            tags: as_text_list(get("tags")),
            archetype_feat: !as_bool(get("char_feat")),
        }),
        CodexKind::Skills => CodexView::Skill(SkillView {
            code,
            name,
            description,
            ability: as_text_list(get("ability")),
            base_skill: as_opt_text(get("base_skill")),
        }),
        CodexKind::Species => CodexView::Species(SpeciesView {
            code,
            name,
            description,
            sizes: as_text_list(get("sizes")),
            traits: as_text_list(get("traits")),
            flaws: as_text_list(get("flaws")),
            characteristics: as_text_list(get("characteristics")),
            skills: as_text_list(get("skills")),
            languages: as_text_list(get("languages")),
            ave_height: as_f64_or(get("ave_height"), 0.0),
            ave_weight: as_f64_or(get("ave_weight"), 0.0),
        }),
        CodexKind::Traits => CodexView::Trait(TraitView {
            code,
            name,
            description,
            uses_per_rec: as_i32_or(get("uses_per_rec"), 0),
            rec_period: as_opt_text(get("rec_period")),
            flaw: as_bool(get("flaw")),
            characteristic: as_bool(get("characteristic")),
        }),
        CodexKind::Parts => CodexView::Part(PartView {
            code,
            name,
            description,
            category: as_text(get("category")),
            technique: as_text(get("type")).eq_ignore_ascii_case("technique"),
            base_en: as_f64_or(get("base_en"), 0.0),
            base_tp: as_f64_or(get("base_tp"), 0.0),
            op_1_en: as_f64_or(get("op_1_en"), 0.0),
            op_1_tp: as_f64_or(get("op_1_tp"), 0.0),
            op_2_en: as_f64_or(get("op_2_en"), 0.0),
            op_2_tp: as_f64_or(get("op_2_tp"), 0.0),
            op_3_en: as_f64_or(get("op_3_en"), 0.0),
            op_3_tp: as_f64_or(get("op_3_tp"), 0.0),
            percentage: as_bool(get("percentage")),
            mechanic: as_bool(get("mechanic")),
        }),
        CodexKind::Properties => CodexView::Property(PropertyView {
            code,
            name,
            description,
            property_type: as_text(get("type")),
            base_ip: as_f64_or(get("base_ip"), 0.0),
            base_tp: as_f64_or(get("base_tp"), 0.0),
            base_c: as_f64_or(get("base_c"), 0.0),
            op_1_ip: as_f64_or(get("op_1_ip"), 0.0),
            op_1_tp: as_f64_or(get("op_1_tp"), 0.0),
            op_1_c: as_f64_or(get("op_1_c"), 0.0),
        }),
        CodexKind::Equipment => CodexView::Equipment(EquipmentView {
            code,
            name,
            description,
            category: as_text(get("category")),
            currency: as_i32_or(get("currency"), 0),
            rarity: as_opt_text(get("rarity")),
            weight: as_f64_or(get("weight"), 0.0),
        }),
        CodexKind::Archetypes => CodexView::Archetype(ArchetypeView {
            code,
            name,
            description,
            abilities: as_text_list(get("abilities")),
            feats: as_text_list(get("feats")),
        }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn part_row_becomes_part_def() {
        let data = json!({
            "base_en": "2",
            "base_tp": 1,
            "op_1_en": 1.5,
            "op_1_tp": "0.5",
            "percentage": "no",
            "type": "Power"
        });
        let CodexView::Part(view) = shape(CodexKind::Parts, "fire", "Fire", &data) else {
            panic!("expected a part view");
        };
        assert!(!view.technique);
        let def = view.to_part_def();
        assert_eq!(def.base_energy, 2.0);
        assert_eq!(def.options[0].energy, 1.5);
        assert_eq!(def.options[0].tp, 0.5);
        assert_eq!(def.options[2].energy, 0.0);
        assert!(!def.percentage);
    }

    #[test]
    fn feat_lists_accept_mixed_shapes() {
        let data = json!({
            "ability_req": "strength, vitality",
            "abil_req_val": [1, "2"],
            "lvl_req": "4",
            "tags": null,
            "char_feat": "yes"
        });
        let CodexView::Feat(view) = shape(CodexKind::Feats, "brawler", "Brawler", &data) else {
            panic!("expected a feat view");
        };
        assert_eq!(view.ability_req, vec!["strength", "vitality"]);
        assert_eq!(view.abil_req_val, vec![1, 2]);
        assert_eq!(view.level_req, 4);
        assert!(view.tags.is_empty());
        assert!(!view.archetype_feat);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let view = shape(CodexKind::Skills, "athletics", "Athletics", &json!({}));
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["kind"], "skill");
        assert_eq!(value["code"], "athletics");
        assert_eq!(view.code(), "athletics");
    }

    #[test]
    fn property_row_becomes_property_def() {
        let data = json!({ "base_ip": 1, "base_c": "20", "op_1_c": 40 });
        let CodexView::Property(view) = shape(CodexKind::Properties, "dmg", "Damage", &data)
        else {
            panic!("expected a property view");
        };
        let def = view.to_property_def();
        assert_eq!(def.base_currency, 20.0);
        assert_eq!(def.option_currency, 40.0);
        assert_eq!(def.base_ip, 1.0);
    }
}

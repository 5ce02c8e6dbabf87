//! Item class lookups: rune buckets and standard socket counts.
//!
//! Unknown classes are not an error. They map to no buckets and zero
//! sockets, which switches padding and rune lookups off for the item.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::lines::ItemDescription;

pub const HELMET: &str = "helmet";
pub const BOOTS: &str = "boots";
pub const GLOVES: &str = "gloves";
pub const BODY_ARMOUR: &str = "body armour";
pub const ARMOUR: &str = "armour";
pub const SHIELD: &str = "shield";
pub const FOCUS: &str = "focus";
pub const WEAPON: &str = "weapon";
pub const BOW: &str = "bow";
pub const CROSSBOW: &str = "crossbow";
pub const CASTER: &str = "caster";
pub const SCEPTRE: &str = "sceptre";

/// Copied game text pluralizes class names; the tables use singular names.
const PLURALS: &[(&str, &str)] = &[
    ("helmets", "helmet"),
    ("body armours", "body armour"),
    ("chests", "chest"),
    ("shields", "shield"),
    ("foci", "focus"),
    ("bows", "bow"),
    ("crossbows", "crossbow"),
    ("wands", "wand"),
    ("staves", "staff"),
    ("sceptres", "sceptre"),
    ("one hand maces", "one hand mace"),
    ("two hand maces", "two hand mace"),
    ("quarterstaves", "quarterstaff"),
    ("spears", "spear"),
    ("amulets", "amulet"),
    ("rings", "ring"),
    ("belts", "belt"),
    ("quivers", "quiver"),
];

static BOW_WORD: Lazy<Regex> = Lazy::new(|| keyword(r"\bbow\b"));
static CROSSBOW_WORD: Lazy<Regex> = Lazy::new(|| keyword(r"\bcrossbow\b"));
static STAFF_WORD: Lazy<Regex> = Lazy::new(|| keyword(r"\bstaff|stave|staves\b"));
static WAND_WORD: Lazy<Regex> = Lazy::new(|| keyword(r"\bwand\b"));
static SHIELD_WORD: Lazy<Regex> = Lazy::new(|| keyword(r"\bshield\b"));
static FOCUS_WORD: Lazy<Regex> = Lazy::new(|| keyword(r"\bfocus\b"));

fn keyword(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid keyword regex {pattern}: {e}"))
}

/// Lower-cased, singular class name.
#[must_use]
pub fn normalize_class(class_name: &str) -> String {
    let lower = class_name.trim().to_lowercase();
    PLURALS
        .iter()
        .find(|(plural, _)| *plural == lower)
        .map_or(lower, |(_, single)| (*single).to_string())
}

fn bucket_set(class: &str) -> BTreeSet<&'static str> {
    let labels: &[&'static str] = match class {
        "helmet" => &[HELMET, ARMOUR],
        "boots" => &[BOOTS, ARMOUR],
        "gloves" => &[GLOVES, ARMOUR],
        "body armour" | "body armor" | "chest" => &[BODY_ARMOUR, ARMOUR],
        "shield" => &[SHIELD, ARMOUR],
        "focus" => &[FOCUS, ARMOUR],
        "bow" => &[BOW, WEAPON],
        "crossbow" => &[CROSSBOW, WEAPON],
        "wand" | "staff" => &[CASTER],
        "sceptre" => &[SCEPTRE],
        "one hand mace" | "two hand mace" | "quarterstaff" | "spear" => &[WEAPON],
        _ => &[],
    };
    labels.iter().copied().collect()
}

/// Sorted, comma-joined rune bucket labels for a class; empty when unknown.
///
/// The result doubles as the rune catalog cache key, so the order is
/// alphabetical no matter how the table lists the labels.
#[must_use]
pub fn buckets_for_class(class_name: &str) -> String {
    bucket_set(&normalize_class(class_name))
        .into_iter()
        .collect::<Vec<_>>()
        .join(",")
}

/// Standard maximum sockets for a class, falling back to type keywords.
///
/// Advisory only; used when padding sockets up to the standard max.
#[must_use]
pub fn max_sockets_for_class(class_name: &str, type_text: &str) -> usize {
    let class = normalize_class(class_name);
    let kind = type_text.to_lowercase();

    if matches!(class.as_str(), "body armour" | "body armor" | "chest")
        || ["body armour", "body armor", "chest"]
            .iter()
            .any(|k| kind.contains(k))
    {
        return 2;
    }
    if class == "helmet" || kind.contains("helm") {
        return 1;
    }
    if class == "gloves" || kind.contains("glove") {
        return 1;
    }
    if class == "boots" || kind.contains("boot") {
        return 1;
    }

    match class.as_str() {
        "bow" | "crossbow" | "staff" | "quarterstaff" | "spear" | "two hand mace" => return 2,
        "wand" | "one hand mace" | "shield" | "focus" => return 1,
        "amulet" | "ring" | "belt" | "quiver" => return 0,
        _ => {}
    }

    if BOW_WORD.is_match(&kind) || CROSSBOW_WORD.is_match(&kind) || STAFF_WORD.is_match(&kind) {
        return 2;
    }
    if WAND_WORD.is_match(&kind) || SHIELD_WORD.is_match(&kind) || FOCUS_WORD.is_match(&kind) {
        return 1;
    }
    0
}

/// Read-only facts about an item, computed once at extraction time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemMeta {
    pub observed_sockets: usize,
    pub max_sockets: usize,
    /// Sorted, comma-joined rune buckets.
    pub buckets: String,
    pub type_label: String,
}

impl ItemMeta {
    #[must_use]
    pub fn classify(class_name: &str, type_text: &str, observed_sockets: usize) -> Self {
        let max_sockets = max_sockets_for_class(class_name, type_text);
        let base = class_name.trim();
        let mut type_label = if base.is_empty() {
            "Item".to_string()
        } else {
            base.to_string()
        };
        if max_sockets == 0 {
            type_label.push_str(" (no sockets)");
        }

        Self {
            observed_sockets,
            max_sockets,
            buckets: buckets_for_class(class_name),
            type_label,
        }
    }

    /// Derive meta from the card text alone (class line, type line, sockets).
    #[must_use]
    pub fn from_description(desc: &ItemDescription) -> Self {
        Self::classify(
            desc.item_class().unwrap_or_default(),
            desc.type_line().unwrap_or_default(),
            desc.declared_sockets(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn armour_classes_join_armour_bucket() {
        assert_eq!(buckets_for_class("Helmet"), "armour,helmet");
        assert_eq!(buckets_for_class("Body Armour"), "armour,body armour");
        assert_eq!(buckets_for_class("chest"), "armour,body armour");
        assert_eq!(buckets_for_class("Shield"), "armour,shield");
    }

    #[test]
    fn weapon_buckets() {
        assert_eq!(buckets_for_class("Bow"), "bow,weapon");
        assert_eq!(buckets_for_class("Crossbows"), "crossbow,weapon");
        assert_eq!(buckets_for_class("Wand"), "caster");
        assert_eq!(buckets_for_class("Staff"), "caster");
        assert_eq!(buckets_for_class("Sceptre"), "sceptre");
        assert_eq!(buckets_for_class("Two Hand Mace"), "weapon");
        assert_eq!(buckets_for_class("Spears"), "weapon");
    }

    #[test]
    fn unknown_class_has_no_buckets() {
        assert_eq!(buckets_for_class("Ring"), "");
        assert_eq!(buckets_for_class(""), "");
        assert_eq!(buckets_for_class("Flask"), "");
    }

    #[test]
    fn max_sockets_table() {
        assert_eq!(max_sockets_for_class("Body Armour", ""), 2);
        assert_eq!(max_sockets_for_class("Chest", ""), 2);
        assert_eq!(max_sockets_for_class("Chests", ""), 2);
        assert_eq!(buckets_for_class("Chests"), "armour,body armour");
        assert_eq!(max_sockets_for_class("Helmet", ""), 1);
        assert_eq!(max_sockets_for_class("Boots", ""), 1);
        assert_eq!(max_sockets_for_class("Quarterstaff", ""), 2);
        assert_eq!(max_sockets_for_class("One Hand Mace", ""), 1);
        assert_eq!(max_sockets_for_class("Foci", ""), 1);
        assert_eq!(max_sockets_for_class("Ring", ""), 0);
        assert_eq!(max_sockets_for_class("Amulets", "Gold Amulet"), 0);
    }

    #[test]
    fn max_sockets_falls_back_to_type_keywords() {
        assert_eq!(max_sockets_for_class("", "Recurve Bow"), 2);
        assert_eq!(max_sockets_for_class("", "Gnarled Staff"), 2);
        assert_eq!(max_sockets_for_class("", "Plated Greathelm"), 1);
        assert_eq!(max_sockets_for_class("", "Withered Wand"), 1);
        assert_eq!(max_sockets_for_class("", "Rusted Cuirass"), 0);
        assert_eq!(max_sockets_for_class("", "Rainbow"), 0);
    }

    #[test]
    fn meta_from_description() {
        let desc = ItemDescription::parse(
            "Item Class: Boots\nRarity: Magic\nSwift Leather Boots\n--------\nItem Level: 40",
        );
        let meta = ItemMeta::from_description(&desc);
        assert_eq!(meta.observed_sockets, 0);
        assert_eq!(meta.max_sockets, 1);
        assert_eq!(meta.buckets, "armour,boots");
        assert_eq!(meta.type_label, "Boots");
    }

    #[test]
    fn sockless_classes_get_labelled() {
        let meta = ItemMeta::classify("Ring", "Iron Ring", 0);
        assert_eq!(meta.type_label, "Ring (no sockets)");
        assert_eq!(ItemMeta::classify("", "", 0).type_label, "Item (no sockets)");
    }
}

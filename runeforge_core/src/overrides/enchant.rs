//! Amulet enchant override.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::OverrideConfig;
use crate::item::{ItemDescription, Line, LineKind, normalize_class};

/// What the enchant override did to the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnchantAction {
    /// Override disabled, no enchant configured, or not an amulet.
    #[default]
    None,
    /// No enchant line existed before.
    Added,
    /// One or more enchant lines were replaced.
    Overridden,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnchantResult {
    pub action: EnchantAction,
    /// The enchant line written to the card, if any.
    pub applied_text: Option<String>,
}

/// Amulet by explicit class line, or by a type line mentioning "amulet".
#[must_use]
pub fn is_amulet(item: &ItemDescription) -> bool {
    if item
        .item_class()
        .is_some_and(|class| normalize_class(class).starts_with("amulet"))
    {
        return true;
    }
    item.type_line()
        .is_some_and(|line| line.to_lowercase().contains("amulet"))
}

/// Replace every `Allocates ...` line of an amulet with the configured one.
#[must_use]
pub fn apply_enchant_override(
    item: &ItemDescription,
    config: &OverrideConfig,
) -> (ItemDescription, EnchantResult) {
    let enchant = config.enchant_text().trim();
    if !config.enchant_enabled() || enchant.is_empty() || !is_amulet(item) {
        return (item.clone(), EnchantResult::default());
    }

    let mut text = item.clone();
    let removed = text.remove_where(|kind| *kind == LineKind::Enchant);
    let block = vec![Line::new(enchant)];

    let anchor = text
        .find_kind(&LineKind::ItemLevel)
        .or_else(|| text.find_kind(&LineKind::Requires))
        .or_else(|| text.first_separator());
    match anchor {
        Some(idx) => text.insert_block_before(idx, block),
        None => text.push_block(block),
    };

    let action = if removed > 0 {
        EnchantAction::Overridden
    } else {
        EnchantAction::Added
    };
    debug!("Amulet enchant {action:?}: {enchant}");

    (
        text,
        EnchantResult {
            action,
            applied_text: Some(enchant.to_string()),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::ConfigUpdate;

    fn enchant_cfg(text: &str) -> OverrideConfig {
        OverrideConfig::from_updates([
            ConfigUpdate::EnchantEnabled(true),
            ConfigUpdate::SelectEnchant {
                id: "enchant.stat_1".into(),
                text: text.into(),
            },
        ])
        .unwrap()
    }

    #[test]
    fn detects_amulets() {
        assert!(is_amulet(&ItemDescription::parse(
            "Item Class: Amulets\nRarity: Rare\nGloom Beads"
        )));
        assert!(is_amulet(&ItemDescription::parse(
            "Rarity: Magic\nLapis Amulet of the Whelpling\n--------\nItem Level: 12"
        )));
        assert!(!is_amulet(&ItemDescription::parse(
            "Item Class: Rings\nRarity: Rare\nDoom Loop\nIron Ring"
        )));
    }

    #[test]
    fn adds_enchant_before_item_level() {
        let item = ItemDescription::parse(
            "Item Class: Amulet\nRarity: Rare\nVortex Charm\nJade Amulet\n--------\nItem Level: 75\n--------\n+20 to Dexterity",
        );
        let (text, result) = apply_enchant_override(&item, &enchant_cfg("Allocates Inspiration"));

        assert_eq!(result.action, EnchantAction::Added);
        assert_eq!(result.applied_text.as_deref(), Some("Allocates Inspiration"));
        assert_eq!(
            text.serialize(),
            "Item Class: Amulet\nRarity: Rare\nVortex Charm\nJade Amulet\n--------\nAllocates Inspiration\n--------\nItem Level: 75\n--------\n+20 to Dexterity"
        );
    }

    #[test]
    fn override_is_idempotent() {
        let item = ItemDescription::parse(
            "Item Class: Amulet\nRarity: Rare\nVortex Charm\nJade Amulet\n--------\nItem Level: 75\n--------\nAllocates Commitment\n--------\n+20 to Dexterity",
        );
        let cfg = enchant_cfg("Allocates Inspiration");
        let (once, first) = apply_enchant_override(&item, &cfg);
        let (twice, second) = apply_enchant_override(&once, &cfg);

        assert_eq!(first.action, EnchantAction::Overridden);
        assert_eq!(second.action, EnchantAction::Overridden);
        assert_eq!(once, twice);
    }

    #[test]
    fn falls_back_to_requires_then_first_separator_then_end() {
        let item =
            ItemDescription::parse("Rarity: Normal\nJade Amulet\n--------\nRequires: Level 5");
        let (text, _) = apply_enchant_override(&item, &enchant_cfg("Allocates Inspiration"));
        assert_eq!(
            text.serialize(),
            "Rarity: Normal\nJade Amulet\n--------\nAllocates Inspiration\n--------\nRequires: Level 5"
        );

        let item =
            ItemDescription::parse("Rarity: Unique\nThe Anvil\nBronze Amulet\n--------\n+8 to Armour");
        let (text, _) = apply_enchant_override(&item, &enchant_cfg("Allocates Heartstopping"));
        assert_eq!(
            text.serialize(),
            "Rarity: Unique\nThe Anvil\nBronze Amulet\n--------\nAllocates Heartstopping\n--------\n+8 to Armour"
        );

        let item = ItemDescription::parse("Rarity: Normal\nCrimson Amulet");
        let (text, result) = apply_enchant_override(&item, &enchant_cfg("Allocates Heartstopping"));
        assert_eq!(result.action, EnchantAction::Added);
        assert_eq!(
            text.serialize(),
            "Rarity: Normal\nCrimson Amulet\n--------\nAllocates Heartstopping"
        );
    }

    #[test]
    fn disabled_or_blank_enchant_does_nothing() {
        let item = ItemDescription::parse("Item Class: Amulet\nRarity: Normal\nJade Amulet");
        let mut cfg = enchant_cfg("Allocates Inspiration");
        cfg.apply(ConfigUpdate::EnchantEnabled(false)).unwrap();
        let (text, result) = apply_enchant_override(&item, &cfg);
        assert_eq!(text, item);
        assert_eq!(result, EnchantResult::default());

        cfg.apply(ConfigUpdate::EnchantEnabled(true)).unwrap();
        cfg.apply(ConfigUpdate::ClearEnchant).unwrap();
        let (_, result) = apply_enchant_override(&item, &cfg);
        assert_eq!(result.action, EnchantAction::None);
    }
}

//! Override engines and the combined transform entry point.

mod config;
mod enchant;
mod rune;

pub use config::{ConfigUpdate, MAX_SOCKETS, OverrideConfig};
pub use enchant::{EnchantAction, EnchantResult, apply_enchant_override, is_amulet};
pub use rune::{RuneOutcome, apply_rune_override, observed_sockets, target_sockets};

use crate::item::{ItemDescription, ItemMeta};

/// Result of running both engines over one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutcome {
    pub text: ItemDescription,
    pub used_runes: Vec<String>,
    pub target_socket_count: usize,
    pub enchant: EnchantResult,
}

/// Sockets and runes first, then the amulet enchant.
///
/// Pure: the same snapshot of `config` always yields the same output.
#[must_use]
pub fn transform(
    item: &ItemDescription,
    meta: &ItemMeta,
    config: &OverrideConfig,
) -> TransformOutcome {
    let runes = apply_rune_override(item, meta, config);
    let (text, enchant) = apply_enchant_override(&runes.text, config);

    TransformOutcome {
        text,
        used_runes: runes.used_runes,
        target_socket_count: runes.target_socket_count,
        enchant,
    }
}

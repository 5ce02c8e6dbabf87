use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use runeforge_config::Config;
use runeforge_core::{
    ItemDescription, ItemMeta, RuneCatalog, TransformOutcome, check_compatibility, transform,
};
use tracing::info;

use super::{read_item, service_client};

/// Input parameters for the Transform command strategy.
#[derive(Debug, Clone)]
pub struct TransformInput {
    /// Item text file; stdin when absent
    pub path: Option<PathBuf>,
    /// Validate applied runes against the service's catalog
    pub check: bool,
}

/// Strategy for applying the override policy to one item card.
///
/// The transformed card goes to stdout, the summary to stderr, so the
/// output can be piped straight back into the game or the trade site.
#[derive(Debug, Clone, Copy)]
pub struct TransformStrategy;

impl super::CommandStrategy for TransformStrategy {
    type Input = TransformInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let item = ItemDescription::parse(&read_item(input.path.as_deref())?);
        if item.is_blank() {
            anyhow::bail!("No item text");
        }

        let meta = ItemMeta::from_description(&item);
        info!(
            "Item: {} (buckets {:?}, sockets {}/{})",
            meta.type_label, meta.buckets, meta.observed_sockets, meta.max_sockets
        );
        let outcome = transform(&item, &meta, &config.overrides);

        println!("{}", outcome.text);
        eprintln!("{}", summary(&outcome));

        if input.check {
            let catalog = RuneCatalog::new(Arc::new(service_client(&config)?));
            let runes = catalog
                .runes_for(&meta.buckets)
                .await
                .context("Failed to load rune catalog")?;
            if check_compatibility(&outcome.used_runes, Some(runes.as_slice())) {
                eprintln!("warning: wrong item type, these runes do not fit this item");
            } else {
                eprintln!("runes ok for {}", meta.type_label);
            }
        }
        Ok(())
    }
}

pub fn summary(outcome: &TransformOutcome) -> String {
    let mut out = format!(
        "runes applied: {}/{}",
        outcome.used_runes.len(),
        outcome.target_socket_count
    );
    for rune in &outcome.used_runes {
        out.push_str("\n  ");
        out.push_str(rune);
    }
    if let Some(text) = &outcome.enchant.applied_text {
        out.push_str(&format!(
            "\nenchant {:?}: {text}",
            outcome.enchant.action
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use runeforge_core::{ConfigUpdate, OverrideConfig};

    #[test]
    fn summary_lists_runes_and_enchant() {
        let item = ItemDescription::parse(
            "Item Class: Amulet\nRarity: Rare\nJade Amulet\n--------\nItem Level: 80",
        );
        let cfg = OverrideConfig::from_updates([
            ConfigUpdate::EnchantEnabled(true),
            ConfigUpdate::SelectEnchant {
                id: "e1".into(),
                text: "Allocates Inspiration".into(),
            },
        ])
        .unwrap();
        let outcome = transform(&item, &ItemMeta::from_description(&item), &cfg);

        assert_eq!(
            summary(&outcome),
            "runes applied: 0/0\nenchant Added: Allocates Inspiration"
        );
    }
}

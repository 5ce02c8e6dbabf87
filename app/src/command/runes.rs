use std::sync::Arc;

use anyhow::Context;
use runeforge_config::Config;
use runeforge_core::RuneCatalog;
use runeforge_core::item::{buckets_for_class, max_sockets_for_class};

use super::service_client;

/// Input parameters for the Runes command strategy.
#[derive(Debug, Clone)]
pub struct RunesInput {
    /// Item class as shown on the card, e.g. "Helmets" or "Two Hand Maces"
    pub class: String,
    /// Base type text, used for socket lookup when the class is unknown
    pub base_type: Option<String>,
}

/// Strategy for listing the runes valid for an item class.
#[derive(Debug, Clone, Copy)]
pub struct RunesStrategy;

impl super::CommandStrategy for RunesStrategy {
    type Input = RunesInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let buckets = buckets_for_class(&input.class);
        let max = max_sockets_for_class(&input.class, input.base_type.as_deref().unwrap_or(""));

        if buckets.is_empty() {
            eprintln!("{} takes no runes", input.class);
            return Ok(());
        }
        eprintln!("buckets: {buckets} (max sockets {max})");

        let catalog = RuneCatalog::new(Arc::new(service_client(&config)?));
        let runes = catalog
            .runes_for(&buckets)
            .await
            .context("Failed to load rune catalog")?;
        for rune in runes {
            println!("{rune}");
        }
        Ok(())
    }
}

use std::sync::Arc;

use anyhow::Context;
use runeforge_config::Config;
use runeforge_core::EnchantCatalog;

use super::service_client;

/// Input parameters for the Enchants command strategy.
#[derive(Debug, Clone)]
pub struct EnchantsInput {
    /// Case-insensitive substring; empty lists the first page
    pub query: String,
    /// Overrides `relay.enchant_limit` for this search
    pub limit: Option<usize>,
}

/// Strategy for searching amulet enchants, one `id<TAB>text` per line.
#[derive(Debug, Clone, Copy)]
pub struct EnchantsStrategy;

impl super::CommandStrategy for EnchantsStrategy {
    type Input = EnchantsInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let mut client = service_client(&config)?;
        if let Some(limit) = input.limit {
            client = client.with_enchant_limit(limit);
        }

        let catalog = EnchantCatalog::new(Arc::new(client));
        let entries = catalog
            .search(&input.query)
            .await
            .context("Failed to search enchants")?;
        if entries.is_empty() {
            eprintln!("no enchants match {:?}", input.query);
        }
        for entry in entries {
            println!("{}\t{}", entry.id, entry.text);
        }
        Ok(())
    }
}

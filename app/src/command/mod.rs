//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! statically from `main`.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use runeforge_config::Config;
use runeforge_core::{ItemPipeline, RuneCatalog, SharedConfig};
use runeforge_providers::PobClient;
use tokio::sync::RwLock;
use tracing::info;

mod enchants;
mod impact;
mod info;
mod init;
mod load_build;
mod relay;
mod runes;
mod set;
mod transform;
mod version;

pub use enchants::{EnchantsInput, EnchantsStrategy};
pub use impact::ImpactStrategy;
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use load_build::LoadBuildStrategy;
pub use relay::RelayStrategy;
pub use runes::{RunesInput, RunesStrategy};
pub use set::{SetInput, SetStrategy};
pub use transform::{TransformInput, TransformStrategy};
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
///
/// Each strategy defines its own input type via the associated type, so
/// adding a command only requires implementing this trait.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// HTTP client configured from the `service` and `relay` sections.
fn service_client(config: &Config) -> anyhow::Result<PobClient> {
    info!("Using service at {}", config.service.base_url);
    Ok(PobClient::new(config.service.timeout())?
        .with_base_url(config.service.base_url.clone())
        .with_retry_delays(config.service.retry_delays())
        .with_enchant_limit(config.relay.enchant_limit))
}

/// Item pipeline over the live service, sharing the loaded override policy.
fn build_pipeline(config: &Config, client: Arc<PobClient>) -> (SharedConfig, Arc<ItemPipeline>) {
    let shared: SharedConfig = Arc::new(RwLock::new(config.overrides.clone()));
    let runes = Arc::new(RuneCatalog::new(client.clone()));
    let pipeline = Arc::new(ItemPipeline::new(runes, client, Arc::clone(&shared)));
    (shared, pipeline)
}

/// Item text from a file, or stdin when no path is given.
///
/// Trailing line breaks from the file or terminal are not part of the card.
fn read_item(path: Option<&Path>) -> anyhow::Result<String> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read item text from {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read item text from stdin")?;
            buf
        }
    };
    Ok(raw.trim_end_matches(['\r', '\n']).to_string())
}

/// Persist the override record after the pipeline touched it.
async fn persist_overrides(mut config: Config, shared: &SharedConfig) -> anyhow::Result<()> {
    config.overrides = shared.read().await.clone();
    config.save()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_file_loses_trailing_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("item.txt");
        std::fs::write(&path, "Rarity: Rare\r\nIron Cap\r\n\n").unwrap();

        assert_eq!(read_item(Some(&path)).unwrap(), "Rarity: Rare\r\nIron Cap");
    }

    #[test]
    fn missing_item_file_is_an_error() {
        let err = read_item(Some(Path::new("/nonexistent/item.txt"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read item text"));
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use runeforge_config::Config;
use runeforge_core::{ItemDescription, ItemRequest};
use tracing::info;

use super::transform::summary;
use super::{build_pipeline, persist_overrides, read_item, service_client};

/// Strategy for transforming an item and asking the service for its impact.
///
/// Prints the service's HTML fragment to stdout. The bucket key seen for
/// this item is remembered in the config file.
#[derive(Debug, Clone, Copy)]
pub struct ImpactStrategy;

impl super::CommandStrategy for ImpactStrategy {
    /// Item text file; stdin when absent.
    type Input = Option<PathBuf>;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let text = read_item(input.as_deref())?;
        if ItemDescription::parse(&text).is_blank() {
            anyhow::bail!("No item text");
        }

        let client = Arc::new(service_client(&config)?);
        let (shared, pipeline) = build_pipeline(&config, client);

        let report = pipeline
            .prepare(&ItemRequest {
                item: text,
                ..ItemRequest::default()
            })
            .await?;
        eprintln!("{}", summary(&report.outcome));
        if report.incompatible {
            eprintln!("warning: wrong item type, these runes do not fit this item");
        }

        info!("Requesting impact for {}", report.type_label);
        let html = pipeline.evaluate(&report.outcome).await?;
        println!("{html}");

        persist_overrides(config, &shared).await
    }
}

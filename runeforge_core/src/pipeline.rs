//! One item event, from scraped text to preview and impact reply.

use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use tracing::{info, warn};

use crate::catalog::{ImpactEvaluator, RuneCatalog};
use crate::compat::check_compatibility;
use crate::error::{Error, Result};
use crate::item::ItemDescription;
use crate::overrides::{
    ConfigUpdate, OverrideConfig, TransformOutcome, observed_sockets, transform,
};
use crate::preview::{HTTP_ERROR_HTML, NO_ITEM_TEXT_HTML, Preview};
use crate::relay::{Envelope, ItemRequest, Message, send};

/// Process-wide override policy; last write wins.
pub type SharedConfig = Arc<RwLock<OverrideConfig>>;

/// Everything known locally about an item before the impact call.
#[derive(Debug, Clone)]
pub struct ItemReport {
    pub outcome: TransformOutcome,
    pub incompatible: bool,
    pub type_label: String,
    pub preview_html: String,
}

pub struct ItemPipeline {
    runes: Arc<RuneCatalog>,
    evaluator: Arc<dyn ImpactEvaluator>,
    config: SharedConfig,
}

impl ItemPipeline {
    pub fn new(
        runes: Arc<RuneCatalog>,
        evaluator: Arc<dyn ImpactEvaluator>,
        config: SharedConfig,
    ) -> Self {
        Self {
            runes,
            evaluator,
            config,
        }
    }

    /// Transform the card and build the local preview.
    ///
    /// Catalog failures only weaken the compatibility hint.
    pub async fn prepare(&self, request: &ItemRequest) -> Result<ItemReport> {
        let desc = ItemDescription::parse(&request.item);
        let meta = request.meta(&desc);

        let snapshot = {
            let mut config = self.config.write().await;
            config.apply(ConfigUpdate::LastBucketKey(meta.buckets.clone()))?;
            config.clone()
        };

        let catalog = self.runes.runes_or_empty(&meta.buckets).await;
        let outcome = transform(&desc, &meta, &snapshot);
        let incompatible = check_compatibility(&outcome.used_runes, Some(catalog.as_slice()));
        let observed = observed_sockets(&desc, &meta);

        let preview_html = Preview {
            used_runes: &outcome.used_runes,
            target_socket_count: outcome.target_socket_count,
            added_sockets: outcome.target_socket_count.saturating_sub(observed),
            incompatible,
            enchant: &outcome.enchant,
        }
        .to_html();

        Ok(ItemReport {
            outcome,
            incompatible,
            type_label: meta.type_label,
            preview_html,
        })
    }

    /// Answer one `get_item_impact`: preview first, then the impact result.
    pub async fn handle(
        &self,
        correlation_id: &str,
        request: &ItemRequest,
        tx: &mpsc::Sender<Envelope>,
    ) -> Result<()> {
        if ItemDescription::parse(&request.item).is_blank() {
            let reply = Message::SetItemImpact {
                html: NO_ITEM_TEXT_HTML.to_string(),
            };
            return send(tx, Envelope::new(correlation_id, reply)).await;
        }

        let report = self.prepare(request).await?;
        info!(
            "Item {correlation_id} ({}): {} rune(s), {} socket(s), enchant {:?}",
            report.type_label,
            report.outcome.used_runes.len(),
            report.outcome.target_socket_count,
            report.outcome.enchant.action
        );

        send(
            tx,
            Envelope::new(
                correlation_id,
                Message::SetRunePreview {
                    html: report.preview_html,
                },
            ),
        )
        .await?;

        let html = match self.evaluate(&report.outcome).await {
            Ok(html) => html,
            Err(e) => {
                warn!("Item {correlation_id}: {e}");
                HTTP_ERROR_HTML.to_string()
            }
        };
        send(tx, Envelope::new(correlation_id, Message::SetItemImpact { html })).await
    }

    pub async fn evaluate(&self, outcome: &TransformOutcome) -> Result<String> {
        self.evaluator
            .evaluate_impact(&outcome.text.serialize())
            .await
            .map_err(Error::Impact)
    }
}

//! Typed message channel between the page side and the service side.
//!
//! The correlation id (the card's page-assigned id) is the only join key
//! between a request and the responses it produces.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::catalog::{EnchantCatalog, EnchantCatalogEntry, normalize_bucket_key};
use crate::debounce::Debouncer;
use crate::error::{Error, Result};
use crate::item::{ItemDescription, ItemMeta};
use crate::pipeline::ItemPipeline;

/// An item card as scraped by the page side.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemRequest {
    pub item: String,
    pub sockets: usize,
    pub max_sockets: usize,
    /// Comma-joined rune buckets.
    pub rune_slots: String,
    pub item_type_label: String,
}

impl ItemRequest {
    /// Meta supplied by the page, with gaps filled from the card text.
    #[must_use]
    pub fn meta(&self, desc: &ItemDescription) -> ItemMeta {
        let derived = ItemMeta::from_description(desc);
        let buckets = normalize_bucket_key(&self.rune_slots);
        ItemMeta {
            observed_sockets: if self.sockets > 0 {
                self.sockets
            } else {
                derived.observed_sockets
            },
            max_sockets: if self.max_sockets > 0 {
                self.max_sockets
            } else {
                derived.max_sockets
            },
            buckets: if buckets.is_empty() {
                derived.buckets
            } else {
                buckets
            },
            type_label: if self.item_type_label.trim().is_empty() {
                derived.type_label
            } else {
                self.item_type_label.clone()
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Message {
    GetItemImpact(ItemRequest),
    SetRunePreview { html: String },
    SetItemImpact { html: String },
    SearchEnchants { query: String },
    EnchantOptions { entries: Vec<EnchantCatalogEntry> },
    Toggle { enabled: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Empty for messages that are not tied to a card.
    #[serde(default)]
    pub correlation_id: String,
    pub message: Message,
}

impl Envelope {
    pub fn new(correlation_id: impl Into<String>, message: Message) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            message,
        }
    }

    pub fn from_json(frame: &str) -> Result<Self> {
        Ok(serde_json::from_str(frame)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Send one envelope, mapping a dropped receiver to [`Error::ChannelClosed`].
pub async fn send(tx: &mpsc::Sender<Envelope>, envelope: Envelope) -> Result<()> {
    tx.send(envelope).await.map_err(|_| Error::ChannelClosed)
}

/// Service-side end of the relay.
pub struct Relay {
    pipeline: Arc<ItemPipeline>,
    enchants: Arc<EnchantCatalog>,
    debouncer: Debouncer,
    auto_impact: Arc<AtomicBool>,
}

impl Relay {
    pub fn new(
        pipeline: Arc<ItemPipeline>,
        enchants: Arc<EnchantCatalog>,
        debouncer: Debouncer,
        auto_impact: bool,
    ) -> Self {
        Self {
            pipeline,
            enchants,
            debouncer,
            auto_impact: Arc::new(AtomicBool::new(auto_impact)),
        }
    }

    #[must_use]
    pub fn auto_impact(&self) -> bool {
        self.auto_impact.load(Ordering::SeqCst)
    }

    /// Consume inbound envelopes until the sender side closes.
    ///
    /// Item events run as independent tasks and may answer out of order.
    /// Pending tasks are drained before returning.
    pub async fn run(
        self,
        mut inbound: mpsc::Receiver<Envelope>,
        outbound: mpsc::Sender<Envelope>,
    ) -> Result<()> {
        let mut tasks = JoinSet::new();

        while let Some(envelope) = inbound.recv().await {
            let Envelope {
                correlation_id,
                message,
            } = envelope;

            match message {
                Message::GetItemImpact(request) => {
                    if !self.auto_impact() {
                        debug!("Auto impact off, ignoring {correlation_id}");
                        continue;
                    }
                    let pipeline = Arc::clone(&self.pipeline);
                    let tx = outbound.clone();
                    tasks.spawn(async move {
                        if let Err(e) = pipeline.handle(&correlation_id, &request, &tx).await {
                            warn!("Item {correlation_id} not answered: {e}");
                        }
                    });
                }
                Message::SearchEnchants { query } => {
                    let enchants = Arc::clone(&self.enchants);
                    let tx = outbound.clone();
                    tasks.spawn(self.debouncer.debounce(move || async move {
                        let entries = enchants.search_or_empty(&query).await;
                        let reply =
                            Envelope::new(correlation_id, Message::EnchantOptions { entries });
                        if send(&tx, reply).await.is_err() {
                            warn!("Enchant options dropped, channel closed");
                        }
                    }));
                }
                Message::Toggle { enabled } => {
                    info!("Auto impact {}", if enabled { "enabled" } else { "disabled" });
                    self.auto_impact.store(enabled, Ordering::SeqCst);
                }
                other => warn!("Ignoring outbound-only message from page: {other:?}"),
            }

            while tasks.try_join_next().is_some() {}
        }

        while tasks.join_next().await.is_some() {}
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_json_shape() {
        let envelope = Envelope::new(
            "card-7",
            Message::SetItemImpact {
                html: "<b>+5% DPS</b>".into(),
            },
        );
        let json: serde_json::Value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["correlation_id"], "card-7");
        assert_eq!(json["message"]["kind"], "set_item_impact");
        assert_eq!(json["message"]["payload"]["html"], "<b>+5% DPS</b>");
    }

    #[test]
    fn parses_item_request_with_defaults() {
        let envelope = Envelope::from_json(
            r#"{"correlation_id":"42","message":{"kind":"get_item_impact","payload":{"item":"Rarity: Rare"}}}"#,
        )
        .unwrap();
        let Message::GetItemImpact(request) = envelope.message else {
            panic!("wrong kind");
        };
        assert_eq!(request.item, "Rarity: Rare");
        assert_eq!(request.sockets, 0);
        assert!(request.rune_slots.is_empty());
    }

    #[test]
    fn malformed_frames_are_errors() {
        assert!(matches!(
            Envelope::from_json(r#"{"message":{"kind":"nope"}}"#),
            Err(Error::Frame(_))
        ));
    }

    #[test]
    fn request_meta_prefers_page_values() {
        let desc = ItemDescription::parse("Item Class: Boots\nRarity: Magic\nLeather Boots");
        let request = ItemRequest {
            item: desc.serialize(),
            sockets: 0,
            max_sockets: 0,
            rune_slots: "Boots, Armour".into(),
            item_type_label: String::new(),
        };
        let meta = request.meta(&desc);
        assert_eq!(meta.buckets, "armour,boots");
        assert_eq!(meta.max_sockets, 1);
        assert_eq!(meta.type_label, "Boots");
    }
}

//! Remote rune/enchant catalogs and the collaborator traits behind them.

mod cache;

pub use cache::{EnchantCatalog, MemoCache, RuneCatalog, normalize_bucket_key, normalize_query};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One selectable amulet enchant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnchantCatalogEntry {
    pub id: String,
    pub text: String,
}

/// Lists the runes valid for a normalized bucket key.
#[async_trait]
pub trait RuneSource: Send + Sync {
    async fn list_runes(&self, bucket_key: &str) -> anyhow::Result<Vec<String>>;
}

/// Free-text search over amulet enchants.
#[async_trait]
pub trait EnchantSource: Send + Sync {
    async fn search_enchants(&self, query: &str) -> anyhow::Result<Vec<EnchantCatalogEntry>>;
}

/// Evaluates the final item text, returning a renderable HTML fragment.
#[async_trait]
pub trait ImpactEvaluator: Send + Sync {
    async fn evaluate_impact(&self, item_text: &str) -> anyhow::Result<String>;
}

//! Memoizing catalog caches.
//!
//! Entries never expire; they live as long as the process. Concurrent misses
//! on the same key may both fetch, and the last write wins. A failed fetch
//! leaves the cache untouched.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{EnchantCatalogEntry, EnchantSource, RuneSource};
use crate::error::{Error, Result};

/// String-keyed memo table with an explicit fetch-on-miss path.
#[derive(Debug)]
pub struct MemoCache<V> {
    entries: RwLock<HashMap<String, V>>,
}

impl<V> Default for MemoCache<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<V: Clone + Send + Sync> MemoCache<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn insert(&self, key: impl Into<String>, value: V) {
        self.entries.write().await.insert(key.into(), value);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Return the cached value, or run `fetcher` once and store its result.
    ///
    /// The lock is not held while fetching.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetcher: F) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        if let Some(hit) = self.get(key).await {
            debug!("Catalog cache hit: {key:?}");
            return Ok(hit);
        }
        let value = fetcher().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }
}

/// Split on commas, trim, lower-case, drop empties, sort, re-join.
#[must_use]
pub fn normalize_bucket_key(buckets: &str) -> String {
    let mut labels: Vec<String> = buckets
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    labels.sort();
    labels.join(",")
}

#[must_use]
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Rune lists keyed by bucket set.
pub struct RuneCatalog {
    source: Arc<dyn RuneSource>,
    cache: MemoCache<Vec<String>>,
}

impl RuneCatalog {
    pub fn new(source: Arc<dyn RuneSource>) -> Self {
        Self {
            source,
            cache: MemoCache::new(),
        }
    }

    /// Runes valid for `buckets`. The empty key is answered locally.
    pub async fn runes_for(&self, buckets: &str) -> Result<Vec<String>> {
        let key = normalize_bucket_key(buckets);
        if key.is_empty() {
            if self.cache.get("").await.is_none() {
                self.cache.insert("", Vec::new()).await;
            }
            return Ok(Vec::new());
        }

        self.cache
            .get_or_fetch(&key, || async {
                debug!("Fetching rune catalog for {key:?}");
                self.source.list_runes(&key).await.map_err(Error::Catalog)
            })
            .await
    }

    /// Like [`RuneCatalog::runes_for`], degrading failures to no suggestions.
    pub async fn runes_or_empty(&self, buckets: &str) -> Vec<String> {
        self.runes_for(buckets).await.unwrap_or_else(|e| {
            warn!("Rune catalog unavailable for {buckets:?}: {e}");
            Vec::new()
        })
    }

    pub async fn cached_keys(&self) -> usize {
        self.cache.len().await
    }
}

/// Enchant search results keyed by normalized query.
pub struct EnchantCatalog {
    source: Arc<dyn EnchantSource>,
    cache: MemoCache<Vec<EnchantCatalogEntry>>,
}

impl EnchantCatalog {
    pub fn new(source: Arc<dyn EnchantSource>) -> Self {
        Self {
            source,
            cache: MemoCache::new(),
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<EnchantCatalogEntry>> {
        let key = normalize_query(query);
        self.cache
            .get_or_fetch(&key, || async {
                debug!("Searching enchants for {key:?}");
                self.source.search_enchants(&key).await.map_err(Error::Catalog)
            })
            .await
    }

    pub async fn search_or_empty(&self, query: &str) -> Vec<EnchantCatalogEntry> {
        self.search(query).await.unwrap_or_else(|e| {
            warn!("Enchant search failed for {query:?}: {e}");
            Vec::new()
        })
    }

    pub async fn cached_keys(&self) -> usize {
        self.cache.len().await
    }
}

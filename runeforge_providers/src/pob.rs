use std::collections::BTreeSet;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Response};
use runeforge_core::{EnchantCatalogEntry, EnchantSource, ImpactEvaluator, RuneSource};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::retry::retry_with_backoff;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_ENCHANT_LIMIT: usize = 25;

/// What `/status` reports about the build evaluator process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceStatus {
    pub running: bool,
    #[serde(default)]
    pub import_error: Option<String>,
}

#[derive(Deserialize)]
struct ImpactResponse {
    html: String,
}

/// HTTP client for the local build-evaluation service.
pub struct PobClient {
    client: Client,
    base_url: String,
    retry_delays: Vec<Duration>,
    enchant_limit: usize,
}

impl PobClient {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        info!("Creating PobClient");
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            retry_delays: Vec::new(),
            enchant_limit: DEFAULT_ENCHANT_LIMIT,
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Delays between catalog GET retries. Empty disables retrying.
    #[must_use]
    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }

    #[must_use]
    pub const fn with_enchant_limit(mut self, limit: usize) -> Self {
        self.enchant_limit = limit;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> anyhow::Result<T> {
        let response = self.client.get(self.url(path)).query(query).send().await?;
        Ok(ok_or_body(response).await?.json::<T>().await?)
    }

    async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> anyhow::Result<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Ok(ok_or_body(response).await?.json::<T>().await?)
    }

    pub async fn status(&self) -> anyhow::Result<ServiceStatus> {
        self.get_json("status", &[])
            .await
            .with_context(|| format!("Service not reachable at {}", self.base_url))
    }

    /// Ask the service to load a build; `None` loads its default build.
    pub async fn load_build(&self, path: Option<&str>) -> anyhow::Result<()> {
        let path = path.map(str::trim).filter(|p| !p.is_empty());
        info!("Loading build {}", path.unwrap_or("<service default>"));
        let _: Value = self
            .post_json("load_pob", &json!({ "path": path }))
            .await
            .context("Failed to load build")?;
        Ok(())
    }
}

/// Turn a non-2xx response into an error carrying its body.
async fn ok_or_body(response: Response) -> anyhow::Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    anyhow::bail!("Service returned {status}: {body}")
}

/// Runes come back either as a list or, for an unfiltered query, as
/// bucket -> list. The object form is flattened into one sorted list.
pub fn flatten_runes(value: Value) -> anyhow::Result<Vec<String>> {
    fn strings(items: Vec<Value>) -> impl Iterator<Item = String> {
        items.into_iter().filter_map(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    match value {
        Value::Array(items) => Ok(strings(items).collect()),
        Value::Object(map) => {
            let mut all = BTreeSet::new();
            for (_, entry) in map {
                if let Value::Array(items) = entry {
                    all.extend(strings(items));
                }
            }
            Ok(all.into_iter().collect())
        }
        other => anyhow::bail!("Invalid response format: unexpected runes payload {other}"),
    }
}

fn is_blank_item(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || text.eq_ignore_ascii_case("null")
}

#[async_trait]
impl RuneSource for PobClient {
    async fn list_runes(&self, bucket_key: &str) -> anyhow::Result<Vec<String>> {
        if bucket_key.trim().is_empty() {
            return Ok(Vec::new());
        }
        debug!("Fetching runes for {bucket_key}");
        let query = [("slot", bucket_key.to_string())];
        let value: Value =
            retry_with_backoff(|| self.get_json("runes", &query), &self.retry_delays).await?;
        flatten_runes(value)
    }
}

#[async_trait]
impl EnchantSource for PobClient {
    async fn search_enchants(&self, query: &str) -> anyhow::Result<Vec<EnchantCatalogEntry>> {
        let mut params = vec![("limit", self.enchant_limit.to_string())];
        let q = query.trim();
        if !q.is_empty() {
            params.insert(0, ("q", q.to_string()));
        }
        debug!("Searching enchants for {q:?}");
        retry_with_backoff(
            || self.get_json("amulet-enchants", &params),
            &self.retry_delays,
        )
        .await
    }
}

#[async_trait]
impl ImpactEvaluator for PobClient {
    async fn evaluate_impact(&self, item_text: &str) -> anyhow::Result<String> {
        if is_blank_item(item_text) {
            anyhow::bail!("Empty or invalid item text");
        }
        let response: ImpactResponse = self
            .post_json("item-impact", &json!({ "item": item_text }))
            .await?;
        Ok(response.html)
    }
}

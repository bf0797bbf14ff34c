// SPDX-License-Identifier: PMPL-1.0-or-later
//! Catalog fetching and caching

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::catalog::{parse_design_system, validate_design_system_url, DesignSystem};
use crate::config::DesignSystemConfig;
use crate::error::{Error, Result};

/// Source of design-system catalogs
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<DesignSystem>;
}

/// Fetches documentation pages over HTTP and parses them
pub struct HttpCatalogFetcher {
    client: Client,
}

impl HttpCatalogFetcher {
    pub fn new(config: &DesignSystemConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(std::time::Duration::from_secs(config.fetch_timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CatalogFetcher for HttpCatalogFetcher {
    async fn fetch(&self, url: &str) -> Result<DesignSystem> {
        let validation = validate_design_system_url(url)?;
        if let Some(warning) = validation.warning() {
            warn!("{} ({})", warning, url);
        }

        info!("Fetching design system from {}", url);
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/html,application/json,text/plain")
            .send()
            .await
            .map_err(|e| Error::CatalogFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::CatalogFetch(format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("")
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::CatalogFetch(e.to_string()))?;
        Ok(parse_design_system(url, &body))
    }
}

/// A catalog and when it was fetched
#[derive(Debug, Clone, PartialEq)]
pub struct CachedCatalog {
    pub system: DesignSystem,
    pub fetched_at: DateTime<Utc>,
}

/// Store for fetched catalogs; freshness is the caller's concern
pub trait CatalogCache: Send + Sync {
    fn get(&self, key: &str) -> Option<CachedCatalog>;
    fn put(&self, key: &str, entry: CachedCatalog);
}

#[derive(Debug, Default)]
pub struct InMemoryCatalogCache {
    entries: Mutex<HashMap<String, CachedCatalog>>,
}

impl CatalogCache for InMemoryCatalogCache {
    fn get(&self, key: &str) -> Option<CachedCatalog> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, entry: CachedCatalog) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), entry);
        }
    }
}

/// Cache key for a catalog URL and version
pub fn cache_key(url: &str, version: Option<&str>) -> String {
    format!("{}_{}", url, version.unwrap_or("latest"))
}

/// Wraps a fetcher with a TTL-checked cache
pub struct CachingFetcher {
    inner: Arc<dyn CatalogFetcher>,
    cache: Arc<dyn CatalogCache>,
    ttl: Duration,
}

impl CachingFetcher {
    pub fn new(inner: Arc<dyn CatalogFetcher>, cache: Arc<dyn CatalogCache>, ttl_secs: u64) -> Self {
        let ttl = Duration::seconds(ttl_secs.min(u64::from(u32::MAX)) as i64);
        Self { inner, cache, ttl }
    }
}

#[async_trait]
impl CatalogFetcher for CachingFetcher {
    async fn fetch(&self, url: &str) -> Result<DesignSystem> {
        let key = cache_key(url, None);

        if let Some(cached) = self.cache.get(&key) {
            if Utc::now() - cached.fetched_at < self.ttl {
                debug!("Using cached design system for {}", url);
                return Ok(cached.system);
            }
        }

        let system = self.inner.fetch(url).await?;
        self.cache.put(
            &key,
            CachedCatalog {
                system: system.clone(),
                fetched_at: Utc::now(),
            },
        );
        Ok(system)
    }
}

//! The install / fetch / activate lifecycle.

use std::fmt;

use serde::Serialize;
use tokio::time::sleep;
use url::Url;

use crate::error::{CacheStorageError, FetchError, InstallError, LifecycleError};
use crate::fetcher::Fetcher;
use crate::manifest::{resolve_url, Manifest};
use crate::response::AssetResponse;
use crate::retry::RetryConfig;
use crate::storage::CacheStorage;

/// Where a worker is in its lifecycle.
///
/// ```text
/// Parsed -> Installing -> Installed -> Activating -> Activated
///               |
///               +-> Redundant (install failed)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerPhase {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl fmt::Display for WorkerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerPhase::Parsed => "parsed",
            WorkerPhase::Installing => "installing",
            WorkerPhase::Installed => "installed",
            WorkerPhase::Activating => "activating",
            WorkerPhase::Activated => "activated",
            WorkerPhase::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub cache_name: String,
    /// Resolved URLs now held in the cache.
    pub urls: Vec<String>,
}

/// Result of an activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivateReport {
    pub kept: String,
    pub deleted: Vec<String>,
}

/// Where a fetched asset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchSource {
    Cache,
    Network,
}

/// A fetched asset and how it was served.
#[derive(Debug, Clone)]
pub struct FetchedAsset {
    pub response: AssetResponse,
    pub source: FetchSource,
    /// True if a network response was written to the current cache.
    pub stored: bool,
}

/// Drives one cache generation through its lifecycle.
pub struct AssetWorker<C: CacheStorage, F: Fetcher> {
    storage: C,
    fetcher: F,
    manifest: Manifest,
    origin: Url,
    phase: WorkerPhase,
}

impl<C: CacheStorage, F: Fetcher> AssetWorker<C, F> {
    /// Creates a worker that has not installed anything yet.
    pub fn new(storage: C, fetcher: F, manifest: Manifest, origin: Url) -> Self {
        Self {
            storage,
            fetcher,
            manifest,
            origin,
            phase: WorkerPhase::Parsed,
        }
    }

    /// Creates a worker whose phase reflects what is already in storage.
    ///
    /// If the current generation exists and is the only one, the worker is
    /// activated. If it exists next to older generations, it is installed and
    /// waiting to activate. Otherwise it is freshly parsed.
    pub fn restore(
        storage: C,
        fetcher: F,
        manifest: Manifest,
        origin: Url,
    ) -> Result<Self, CacheStorageError> {
        let keys = storage.keys()?;
        let phase = if !keys.iter().any(|k| *k == manifest.cache_name) {
            WorkerPhase::Parsed
        } else if keys.len() == 1 {
            WorkerPhase::Activated
        } else {
            WorkerPhase::Installed
        };
        tracing::debug!(cache = %manifest.cache_name, %phase, "restored asset worker");

        Ok(Self {
            storage,
            fetcher,
            manifest,
            origin,
            phase,
        })
    }

    pub fn phase(&self) -> WorkerPhase {
        self.phase
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn storage(&self) -> &C {
        &self.storage
    }

    /// URLs held by the current generation.
    pub fn cached_urls(&self) -> Result<Vec<String>, CacheStorageError> {
        self.storage.urls(&self.manifest.cache_name)
    }

    /// Fetches every manifest URL and stores them in the current generation.
    ///
    /// All responses are fetched before anything is written. Any fetch failure or
    /// non-success status fails the install; a generation created by a failed
    /// install is removed again.
    pub async fn install(&mut self) -> Result<InstallReport, InstallError> {
        self.phase = WorkerPhase::Installing;
        let cache_name = self.manifest.cache_name.clone();
        let existed = self.storage.has(&cache_name)?;

        match self.fetch_and_store(&cache_name).await {
            Ok(urls) => {
                self.phase = WorkerPhase::Installed;
                tracing::info!(cache = %cache_name, assets = urls.len(), "installed assets");
                Ok(InstallReport { cache_name, urls })
            }
            Err(e) => {
                self.phase = WorkerPhase::Redundant;
                if !existed {
                    if let Err(cleanup) = self.storage.delete(&cache_name) {
                        tracing::warn!(cache = %cache_name, error = %cleanup, "failed to remove partial cache");
                    }
                }
                tracing::warn!(cache = %cache_name, error = %e, "install failed");
                Err(e)
            }
        }
    }

    async fn fetch_and_store(&self, cache_name: &str) -> Result<Vec<String>, InstallError> {
        let urls = self.manifest.resolve(&self.origin)?;

        let mut entries = Vec::with_capacity(urls.len());
        for url in &urls {
            let response = self.fetcher.fetch(url).await?;
            if !response.is_ok() {
                return Err(InstallError::BadStatus {
                    url: url.to_string(),
                    status: response.status,
                });
            }
            entries.push((url.to_string(), response));
        }

        self.storage.put_all(cache_name, &entries)?;
        Ok(entries.into_iter().map(|(url, _)| url).collect())
    }

    /// Installs, retrying transient failures with exponential backoff.
    pub async fn install_with_retry(
        &mut self,
        retry: &RetryConfig,
    ) -> Result<InstallReport, InstallError> {
        let mut attempt = 0;
        loop {
            match self.install().await {
                Ok(report) => return Ok(report),
                Err(e) if e.is_retryable() && attempt < retry.max_retries => {
                    let backoff = retry.calculate_backoff(attempt);
                    tracing::info!(
                        attempt = attempt + 1,
                        max_retries = retry.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "retrying install"
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Deletes every cache generation other than the current one.
    ///
    /// Requires a completed install. Activating an already active worker only
    /// repeats the cleanup.
    pub fn activate(&mut self) -> Result<ActivateReport, LifecycleError> {
        match self.phase {
            WorkerPhase::Installed | WorkerPhase::Activated => {}
            phase => return Err(LifecycleError::NotInstalled { phase }),
        }

        self.phase = WorkerPhase::Activating;
        match self.delete_stale() {
            Ok(deleted) => {
                self.phase = WorkerPhase::Activated;
                if !deleted.is_empty() {
                    tracing::info!(deleted = ?deleted, "deleted stale caches");
                }
                Ok(ActivateReport {
                    kept: self.manifest.cache_name.clone(),
                    deleted,
                })
            }
            Err(e) => {
                self.phase = WorkerPhase::Installed;
                Err(e.into())
            }
        }
    }

    fn delete_stale(&self) -> Result<Vec<String>, CacheStorageError> {
        let mut deleted = Vec::new();
        for name in self.storage.keys()? {
            if name != self.manifest.cache_name && self.storage.delete(&name)? {
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Serves `url` from any cache, falling back to the network.
    ///
    /// Network responses with status 200 from the app's own origin are stored in the
    /// current generation. A failed store is logged and the response still returned.
    pub async fn fetch(&self, url: &str) -> Result<FetchedAsset, FetchError> {
        let url = resolve_url(&self.origin, url)?;
        let key = url.as_str();

        if let Some(response) = self.storage.match_url(key)? {
            tracing::debug!(url = %key, "cache hit");
            return Ok(FetchedAsset {
                response,
                source: FetchSource::Cache,
                stored: false,
            });
        }

        let response = self.fetcher.fetch(&url).await?;
        let mut stored = false;
        if response.is_cacheable() {
            match self.storage.put(&self.manifest.cache_name, key, &response) {
                Ok(()) => stored = true,
                Err(e) => tracing::warn!(url = %key, error = %e, "failed to cache response"),
            }
        }

        Ok(FetchedAsset {
            response,
            source: FetchSource::Network,
            stored,
        })
    }
}

impl<C: CacheStorage, F: Fetcher> fmt::Debug for AssetWorker<C, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetWorker")
            .field("cache_name", &self.manifest.cache_name)
            .field("origin", &self.origin.as_str())
            .field("phase", &self.phase)
            .finish()
    }
}

//! Network access for the asset worker.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::FetchError;
use crate::manifest::same_origin;
use crate::response::{AssetResponse, ResponseKind};

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Something that can fetch a URL.
///
/// Non-success HTTP statuses are responses, not errors. Only failures to obtain a
/// response at all are `Err`.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&self, url: &Url) -> Result<AssetResponse, FetchError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    async fn fetch(&self, url: &Url) -> Result<AssetResponse, FetchError> {
        (**self).fetch(url).await
    }
}

/// Fetches assets over HTTP(S).
#[derive(Clone)]
pub struct HttpFetcher {
    http_client: reqwest::Client,
    origin: Url,
}

impl HttpFetcher {
    /// Creates a fetcher for an app served from `origin`.
    pub fn new(origin: Url) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http_client,
            origin,
        }
    }

    /// Returns the app origin used to classify responses.
    pub fn origin(&self) -> &Url {
        &self.origin
    }
}

impl fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("origin", &self.origin.as_str())
            .finish()
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<AssetResponse, FetchError> {
        let network_error = |e: reqwest::Error| FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        tracing::debug!(url = %url, "fetching from network");
        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let kind = if same_origin(&self.origin, &final_url) {
            ResponseKind::Basic
        } else {
            ResponseKind::Cors
        };
        let body = response.bytes().await.map_err(network_error)?.to_vec();

        Ok(AssetResponse {
            url: final_url.to_string(),
            status,
            kind,
            content_type,
            body,
        })
    }
}
